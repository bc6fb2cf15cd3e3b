//! Mascot easter eggs and per-subject fun facts.

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use crate::types::text_enum;

text_enum! {
    FactKind ("fact kind") {
        Fact => "fact",
        Joke => "joke",
        Riddle => "riddle",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunFact {
    pub id:      String,
    pub kind:    FactKind,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubjectFacts {
    pub subject: String,
    pub facts:   Vec<FunFact>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FunFactCatalog {
    pub mascot:   Vec<FunFact>,
    pub subjects: Vec<SubjectFacts>,
}

impl FunFactCatalog {
    pub fn random_mascot<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&FunFact> {
        self.mascot.choose(rng)
    }

    /// Subject names match case-insensitively.
    pub fn random_for_subject<R: Rng + ?Sized>(
        &self,
        subject: &str,
        rng: &mut R,
    ) -> Option<&FunFact> {
        self.subjects
            .iter()
            .find(|s| s.subject.eq_ignore_ascii_case(subject))
            .and_then(|s| s.facts.choose(rng))
    }
}
