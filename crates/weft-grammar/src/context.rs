//! Context variable setters.

use regex_automata::meta::Regex;
use weft_core::Symbol;

use crate::state::GrammarState;
use crate::template::Template;

#[derive(Debug)]
pub enum Test {
    NonEmpty,
    Equals(String),
    Matches(Regex),
}

#[derive(Debug)]
pub struct Condition {
    /// Tested text; the whole match when absent.
    pub subject: Option<Template>,
    pub test: Test,
}

impl Condition {
    fn holds(&self, state: &GrammarState, groups: &[Option<&str>]) -> bool {
        let subject = match &self.subject {
            Some(template) => template.expand(state, groups),
            None => groups.first().copied().flatten().unwrap_or_default().to_owned(),
        };
        match &self.test {
            Test::NonEmpty => !subject.is_empty(),
            Test::Equals(expected) => subject == *expected,
            Test::Matches(regex) => regex.is_match(&subject),
        }
    }
}

#[derive(Debug)]
pub struct Setter {
    pub name: Symbol,
    /// New value; `None` removes the variable.
    pub value: Option<Template>,
    pub condition: Option<Condition>,
    pub immediate: bool,
}

impl Setter {
    /// Applies the setter if its condition holds. Returns whether it fired.
    pub fn apply(&self, state: &mut GrammarState, groups: &[Option<&str>]) -> bool {
        if let Some(condition) = &self.condition
            && !condition.holds(state, groups)
        {
            return false;
        }

        match &self.value {
            Some(template) => {
                let value = template.expand(state, groups);
                state.context_mut().set(self.name, value);
            }
            None => state.context_mut().remove(self.name),
        }
        true
    }
}
