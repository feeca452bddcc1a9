//! HTML rendering of the practice page.
//!
//! One self-contained page; every dynamic value is escaped before it is
//! formatted in.

use crate::protocol::PracticeView;
use crate::util::escape_html;

const STYLE: &str = "
  body { font-family: system-ui, sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; }
  textarea { width: 100%; min-height: 12rem; font-family: ui-monospace, monospace; }
  .problem { background: #f4f4f8; padding: 1rem; border-radius: 6px; white-space: pre-wrap; }
  .result { padding: .75rem; border-radius: 6px; white-space: pre-wrap; }
  .result.ok { background: #e6f6e6; }
  .result.fail { background: #fbeaea; }
  .hint { font-style: italic; }
";

pub fn render_practice_page(view: &PracticeView) -> String {
  let topic_options = view
    .topics
    .iter()
    .map(|t| {
      let selected = if *t == view.selected_topic { " selected" } else { "" };
      format!("    <option value=\"{0}\"{1}>{0}</option>", escape_html(t.as_str()), selected)
    })
    .collect::<Vec<_>>()
    .join("\n");

  let result_block = match (&view.result, view.correct) {
    (Some(msg), correct) => {
      let class = if correct == Some(true) { "ok" } else { "fail" };
      format!("<div class=\"result {}\">{}</div>", class, escape_html(msg))
    }
    (None, _) => String::new(),
  };

  let hint_block = view
    .hint
    .as_deref()
    .map(|h| format!("<p class=\"hint\">Hint: {}</p>", escape_html(h)))
    .unwrap_or_default();

  format!(
    r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Adaptipy · Coding Practice</title>
<style>{style}</style>
</head>
<body>
<h1>Coding Practice</h1>
<form method="post" action="/">
  <label for="topic">Topic</label>
  <select id="topic" name="topic">
{topic_options}
  </select>
  <button type="submit" name="select_topic" value="1">Change topic</button>
  <button type="submit" name="new_problem" value="1">New problem</button>
</form>
<h2>Problem</h2>
<div class="problem">{problem}</div>
<form method="post" action="/">
  <textarea name="code" spellcheck="false">{user_code}</textarea>
  <button type="submit">Run</button>
</form>
{result_block}
{hint_block}
</body>
</html>
"#,
    style = STYLE,
    topic_options = topic_options,
    problem = escape_html(&view.problem),
    user_code = escape_html(&view.user_code),
    result_block = result_block,
    hint_block = hint_block,
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Topic;

  fn view() -> PracticeView {
    PracticeView {
      result: None,
      correct: None,
      user_code: String::new(),
      problem: "Print numbers from 5 down to 1".into(),
      topics: Topic::ALL.to_vec(),
      selected_topic: Topic::Recursion,
      hint: None,
    }
  }

  #[test]
  fn lists_every_topic_and_marks_selection() {
    let html = render_practice_page(&view());
    for t in Topic::ALL {
      assert!(html.contains(&format!("<option value=\"{}\"", t.as_str())));
    }
    assert!(html.contains("<option value=\"recursion\" selected>recursion</option>"));
    assert!(html.contains("Print numbers from 5 down to 1"));
    assert!(!html.contains("class=\"result"));
    assert!(!html.contains("class=\"hint\""));
  }

  #[test]
  fn escapes_learner_code_and_messages() {
    let mut v = view();
    v.user_code = "print('<b>{problem}</b>')".into();
    v.result = Some("Not quite right. Expected: 10, Got: <script>".into());
    v.correct = Some(false);
    v.hint = Some("Think about \"order\".".into());
    let html = render_practice_page(&v);
    assert!(html.contains("print(&#39;&lt;b&gt;{problem}&lt;/b&gt;&#39;)"));
    assert!(html.contains("Got: &lt;script&gt;"));
    assert!(html.contains("class=\"result fail\""));
    assert!(html.contains("Hint: Think about &quot;order&quot;."));
  }

  #[test]
  fn success_result_gets_ok_class() {
    let mut v = view();
    v.result = Some("Correct! Your output: 5".into());
    v.correct = Some(true);
    assert!(render_practice_page(&v).contains("class=\"result ok\""));
  }
}
