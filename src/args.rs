use std::fmt;

/// Key whose value selects how an activation is dispatched.
pub const ACTION_KEY: &str = "action";

/// Action values produced by the sample toast.
pub const ACTION_REPLY: &str = "reply";
pub const ACTION_LIKE: &str = "like";
pub const ACTION_VIEW_IMAGE: &str = "viewImage";
pub const ACTION_VIEW_CONVERSATION: &str = "viewConversation";

/// Flat `key=value&key=value` argument string carried by a toast or one of its buttons.
///
/// Values are stored and rendered literally. Nothing is percent-encoded or decoded, so
/// a value containing `&` or `=` will not survive a parse of the rendered string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationArgs {
    pairs: Vec<(String, String)>,
}

impl ActivationArgs {
    /// Starts an argument string whose first pair is `action=<action>`.
    pub fn new(action: &str) -> Self {
        Self::default().with(ACTION_KEY, action)
    }

    /// Appends a pair, keeping insertion order.
    ///
    /// A value may contain `=`, since parsing splits each pair on its first `=` only.
    /// A value containing `&` is kept but logged, it will not parse back unchanged.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if value.contains('&') {
            tracing::warn!(
                target: "args",
                key,
                value = %value,
                "Argument value contains '&' and will not parse back unchanged"
            );
        }
        self.pairs.push((key.to_string(), value));
        self
    }

    /// Splits on `&`, then on the first `=` of each segment.
    ///
    /// A segment without `=` becomes `(segment, "")`. Empty segments are skipped, so an
    /// empty string parses to no pairs at all.
    pub fn parse(raw: &str) -> Self {
        let pairs = raw
            .split('&')
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment.split_once('=') {
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => (segment.to_string(), String::new()),
            })
            .collect();

        Self { pairs }
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn action(&self) -> Option<&str> {
        self.get(ACTION_KEY)
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl fmt::Display for ActivationArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (key, value)) in self.pairs.iter().enumerate() {
            if index > 0 {
                f.write_str("&")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

/// True iff `raw` starts with the literal `action=<candidate>`.
///
/// This is a prefix test on the raw string, not a parsed comparison: `action=replyAll`
/// matches `reply`, and `id=1&action=reply` does not.
pub fn has_action_prefix(raw: &str, candidate: &str) -> bool {
    raw.strip_prefix(ACTION_KEY)
        .and_then(|rest| rest.strip_prefix('='))
        .is_some_and(|rest| rest.starts_with(candidate))
}
