//! Built-in content that keeps the app useful without OpenAI.

use crate::domain::{Problem, Topic};

/// Hint shown when the model cannot be reached or returns nothing usable.
pub const FALLBACK_HINT: &str = "Keep trying! Review the basics and try again.";

/// Canned problem for a topic.
pub fn fallback_problem(topic: Topic) -> Problem {
  let (description, expected) = match topic {
    Topic::Loops => ("Write a loop that prints numbers 1 to 5", "1\n2\n3\n4\n5"),
    Topic::Strings => ("Print each character of 'hello' on separate lines", "h\ne\nl\nl\no"),
    Topic::Arrays => ("Create a list [1,2,3] and print each element", "1\n2\n3"),
    Topic::Recursion => ("Print numbers from 5 down to 1", "5\n4\n3\n2\n1"),
    Topic::Conditionals => ("Print 'even' if 4 is even, 'odd' otherwise", "even"),
    Topic::Variables => ("Create a variable x=10 and print it", "10"),
  };
  Problem::new(description, expected)
}
