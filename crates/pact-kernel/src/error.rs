//! Error types and the name-token boundary guard.
//!
//! Engine operations never raise: unknown queries return empty
//! collections and duplicate submissions are dropped. The only
//! contract callers can break is the name grammar — component,
//! collective, and behavior names are tokens of letters, digits, and
//! hyphens — and that is checked in front of the engine, not inside
//! it.

use crate::collective::Record;
use crate::diagnostic::{Diagnostic, failure_class};
use regex::Regex;
use std::sync::OnceLock;

/// Errors arising from the engine's input contract.
#[derive(Debug, thiserror::Error)]
pub enum PactError {
    /// A name token falls outside letters/digits/hyphen.
    #[error("invalid name: {name:?}")]
    InvalidName { name: String },
}

fn name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9-]+$").expect("name regex must compile"))
}

pub fn is_valid_name(name: &str) -> bool {
    name_re().is_match(name)
}

pub fn validate_name(name: &str) -> Result<(), PactError> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(PactError::InvalidName {
            name: name.to_string(),
        })
    }
}

fn check_name(issues: &mut Vec<Diagnostic>, path: Vec<String>, name: &str) {
    if !is_valid_name(name) {
        issues.push(Diagnostic::new(
            failure_class::INVALID_NAME,
            path,
            format!("name {name:?} is not a letters/digits/hyphen token"),
        ));
    }
}

impl Record {
    /// Check every name token the record carries. Empty means valid.
    ///
    /// This is the engine-side half of the validation contract; full
    /// document validation (schemas, discriminators, syntax) belongs
    /// to the upstream collaborator.
    pub fn validate(&self) -> Vec<Diagnostic> {
        let mut issues = Vec::new();
        match self {
            Record::Component(c) => {
                check_name(&mut issues, vec![c.name().to_string()], c.name());
                for b in c.provides(None).iter().chain(c.wants(None).iter()) {
                    for name in b.names() {
                        check_name(
                            &mut issues,
                            vec![c.name().to_string(), name.clone()],
                            &name,
                        );
                    }
                }
            }
            Record::Collective(c) => {
                check_name(&mut issues, vec![c.name().to_string()], c.name());
                for member in c.claimed() {
                    check_name(
                        &mut issues,
                        vec![c.name().to_string(), member.clone()],
                        &member,
                    );
                }
                for instance in c.instances() {
                    check_name(
                        &mut issues,
                        vec![c.name().to_string(), instance.name.clone()],
                        &instance.name,
                    );
                }
            }
        }
        issues
    }
}
