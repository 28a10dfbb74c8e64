//! Diagnosis model
//!
//! Diagnoses only enrich the episodic summary; they take no part in time
//! alignment.

/// A diagnostic code recorded for a subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnosis {
    pub subject_id: u64,
    /// Stay the diagnosis was recorded for, if known
    pub stay_id: Option<u64>,
    /// ICD-9 diagnosis code
    pub code: String,
}

impl Diagnosis {
    /// Create a new diagnosis
    #[must_use]
    pub const fn new(subject_id: u64, stay_id: Option<u64>, code: String) -> Self {
        Self {
            subject_id,
            stay_id,
            code,
        }
    }

    /// Whether the diagnosis applies to the given stay.
    ///
    /// Diagnoses without a stay id apply to every stay of the subject.
    #[must_use]
    pub fn applies_to(&self, stay_id: u64) -> bool {
        self.stay_id.is_none_or(|id| id == stay_id)
    }

    /// Check if this diagnosis matches a specific code or prefix pattern
    #[must_use]
    pub fn matches_code(&self, pattern: &str) -> bool {
        if pattern.ends_with('*') {
            let prefix = pattern.trim_end_matches('*');
            self.code.starts_with(prefix)
        } else {
            self.code == pattern
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_applies_to() {
        let scoped = Diagnosis::new(1, Some(10), "4019".to_string());
        assert!(scoped.applies_to(10));
        assert!(!scoped.applies_to(11));

        let unscoped = Diagnosis::new(1, None, "4019".to_string());
        assert!(unscoped.applies_to(10));
        assert!(unscoped.applies_to(11));
    }

    #[test]
    fn test_matches_code() {
        let diagnosis = Diagnosis::new(1, None, "4280".to_string());
        assert!(diagnosis.matches_code("4280"));
        assert!(diagnosis.matches_code("428*"));
        assert!(!diagnosis.matches_code("427*"));
        assert!(!diagnosis.matches_code("428"));
    }
}
