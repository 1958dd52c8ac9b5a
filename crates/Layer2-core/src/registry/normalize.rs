//! Control-type key normalization
//!
//! Descriptors coming out of legacy metadata use inconsistent casing
//! ("Select", "NUMERICTEXTBOX"). Normalization matches a requested key
//! against the registered ones: exact first, then case-insensitive, and
//! finally pass-through for keys nobody registered (best-effort
//! compatibility - the registry reports those as not found).
//!
//! This is a pure function, separate from the registry's map mutation.

/// How a requested key matched the registered key set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyMatch {
    /// Requested key is registered as-is
    Exact(String),

    /// A registered key matched ignoring case; carries the registered form
    CaseInsensitive(String),

    /// No registered key matched; carries the request unchanged
    Passthrough(String),
}

impl KeyMatch {
    /// The key to look up in the registry map
    pub fn key(&self) -> &str {
        match self {
            KeyMatch::Exact(k) | KeyMatch::CaseInsensitive(k) | KeyMatch::Passthrough(k) => k,
        }
    }

    pub fn is_passthrough(&self) -> bool {
        matches!(self, KeyMatch::Passthrough(_))
    }
}

/// Match `requested` against the known registered keys
pub fn normalize_key<'a, I>(known: I, requested: &str) -> KeyMatch
where
    I: IntoIterator<Item = &'a str>,
{
    let mut case_insensitive: Option<&str> = None;

    for key in known {
        if key == requested {
            return KeyMatch::Exact(key.to_string());
        }
        if case_insensitive.is_none() && key.eq_ignore_ascii_case(requested) {
            case_insensitive = Some(key);
        }
    }

    match case_insensitive {
        Some(key) => KeyMatch::CaseInsensitive(key.to_string()),
        None => KeyMatch::Passthrough(requested.to_string()),
    }
}
