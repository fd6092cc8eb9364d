//! Prefix-aware naming of logical ids, physical names and descriptions.

/// Applies the deployment prefix to derived identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Naming {
    prefix: String,
}

impl Naming {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `<prefix>-<name>`, or `name` alone without a prefix.
    pub fn qualify(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}-{}", self.prefix, name)
        }
    }

    /// Human readable description led by the prefix.
    pub fn describe(&self, text: &str) -> String {
        format!("{} {}", self.prefix, text).trim().to_string()
    }
}

/// Logical name derived from free text such as a domain:
/// `admin.example.com` becomes `AdminExampleCom`.
pub fn logical_name(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
