use std::sync::Arc;

use crate::activation::Activation;
use crate::activation::rendezvous::{Rendezvous, WindowTransition};
use crate::args::{
    ACTION_LIKE, ACTION_REPLY, ACTION_VIEW_CONVERSATION, ACTION_VIEW_IMAGE, ActivationArgs,
    has_action_prefix,
};
use crate::toast::ToastManager;
use crate::toast::samples::confirmation_toast;

/// Message shown in the window after a foreground activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForegroundMessage {
    ViewImage,
    ViewConversation,
    Default,
}

impl ForegroundMessage {
    /// Picks the message by exact match on the parsed `action` value.
    pub fn for_arguments(args: &ActivationArgs) -> Self {
        match args.action() {
            Some(ACTION_VIEW_IMAGE) => Self::ViewImage,
            Some(ACTION_VIEW_CONVERSATION) => Self::ViewConversation,
            _ => Self::Default,
        }
    }

    pub fn text(&self) -> String {
        match self {
            Self::ViewImage => t!("viewImageMessage").to_string(),
            Self::ViewConversation => t!("viewConversationMessage").to_string(),
            Self::Default => t!("defaultActivationMessage").to_string(),
        }
    }
}

/// What the router did with one activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// `confirmed` is false when the confirmation toast could not be shown
    Replied { reply: String, confirmed: bool },
    Liked { confirmed: bool },
    /// `window` is `None` when the window could not be opened
    Foreground {
        message: ForegroundMessage,
        window: Option<WindowTransition>,
    },
}

impl ActivationOutcome {
    /// Whether this was a background action answered with a confirmation toast.
    pub fn is_background(&self) -> bool {
        matches!(self, Self::Replied { .. } | Self::Liked { .. })
    }
}

/// Decides and carries out the response to each activation.
///
/// Never fails: platform errors are logged, shown in the window when there is one,
/// and the activation is still considered handled.
pub struct ActivationRouter {
    toasts: Arc<ToastManager>,
    rendezvous: Rendezvous,
}

impl ActivationRouter {
    pub fn new(toasts: Arc<ToastManager>, rendezvous: Rendezvous) -> Self {
        Self { toasts, rendezvous }
    }

    pub fn route(&self, activation: &Activation) -> ActivationOutcome {
        let raw = activation.arguments.as_str();
        tracing::info!(
            target: "activation::router",
            app_id = %activation.app_id,
            arguments = %raw,
            inputs = activation.user_input.len(),
            "Routing activation"
        );

        // Matched on the raw string before anything is parsed
        if has_action_prefix(raw, ACTION_REPLY) {
            let reply = activation
                .user_input
                .first_value()
                .unwrap_or_default()
                .to_string();
            let confirmed = self.confirm(&t!("sentReply", reply = reply));
            return ActivationOutcome::Replied { reply, confirmed };
        }

        if has_action_prefix(raw, ACTION_LIKE) {
            let confirmed = self.confirm(&t!("sentLike"));
            return ActivationOutcome::Liked { confirmed };
        }

        let message = ForegroundMessage::for_arguments(&ActivationArgs::parse(raw));
        let window = match self.rendezvous.ensure_window() {
            Ok(transition) => Some(transition),
            Err(e) => {
                tracing::error!(target: "activation::router", error = %e, "Failed to open window for activation");
                None
            }
        };

        if window.is_some() {
            if let Err(e) = self.rendezvous.window().set_display_text(&message.text()) {
                tracing::error!(target: "activation::router", error = %e, "Failed to update window text");
            }
        }

        ActivationOutcome::Foreground { message, window }
    }

    fn confirm(&self, text: &str) -> bool {
        match self.toasts.show(&confirmation_toast(text)) {
            Ok(()) => {
                tracing::debug!(target: "activation::router", text, "Confirmation shown");
                true
            }
            Err(e) => {
                tracing::error!(target: "activation::router", error = %e, "Failed to show confirmation");
                self.report(&e.to_string());
                false
            }
        }
    }

    fn report(&self, text: &str) {
        if !self.rendezvous.roles().has_window() {
            return;
        }
        if let Err(e) = self.rendezvous.window().set_display_text(text) {
            tracing::warn!(target: "activation::router", error = %e, "Failed to report error in window");
        }
    }
}
