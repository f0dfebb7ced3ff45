pub mod rendezvous;
pub mod role;
pub mod router;

/// Text the user typed into the toast's input fields, in the order the platform reported it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInputSet {
    entries: Vec<(String, String)>,
}

impl UserInputSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, value: impl Into<String>) {
        self.entries.push((id.into(), value.into()));
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == id)
            .map(|(_, v)| v.as_str())
    }

    /// Value of the first reported field.
    pub fn first_value(&self) -> Option<&str> {
        self.entries.first().map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for UserInputSet {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// One user interaction with a toast, as delivered by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Activation {
    pub app_id: String,
    /// Raw argument string of the clicked toast or button
    pub arguments: String,
    pub user_input: UserInputSet,
}

impl Activation {
    pub fn new(arguments: impl Into<String>) -> Self {
        Self {
            arguments: arguments.into(),
            ..Default::default()
        }
    }

    pub fn with_input(mut self, id: &str, value: &str) -> Self {
        self.user_input.insert(id, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_input_lookup() {
        let input: UserInputSet = [("tbReply", "great photo!"), ("other", "x")]
            .into_iter()
            .collect();

        assert_eq!(input.get("tbReply"), Some("great photo!"));
        assert_eq!(input.first_value(), Some("great photo!"));
        assert_eq!(input.get("missing"), None);
        assert_eq!(input.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let activation = Activation::new("action=like");
        assert!(activation.user_input.is_empty());
        assert_eq!(activation.user_input.first_value(), None);
    }
}
