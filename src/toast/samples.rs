use crate::args::{
    ACTION_LIKE, ACTION_REPLY, ACTION_VIEW_CONVERSATION, ACTION_VIEW_IMAGE, ActivationArgs,
};
use crate::toast::content::{
    ActivationMode, ImagePlacement, ToastAction, ToastContent, ToastImage, ToastInput,
    ToastTemplate,
};

/// Id of the reply text box on the conversation toast.
pub const REPLY_INPUT_ID: &str = "tbReply";

const AVATAR_URL: &str = "https://unsplash.it/64?image=1005";
const PICTURE_URL: &str = "https://picsum.photos/364/202?image=883";

/// The "Andrew sent you a picture" toast with reply, like and view buttons.
///
/// Remote images are only attached when the platform can render them.
pub fn conversation_toast(conversation_id: u32, with_remote_images: bool) -> ToastContent {
    let conversation = conversation_id.to_string();

    let mut content = ToastContent::new(ToastTemplate::Generic)
        .text(t!("sampleToastTitle"))
        .text(t!("sampleToastBody"))
        .launch(ActivationArgs::new(ACTION_VIEW_CONVERSATION).with("conversationId", &conversation));

    if with_remote_images {
        content = content
            .image(
                ToastImage::new(AVATAR_URL)
                    .with_placement(ImagePlacement::AppLogoOverride)
                    .with_circle_crop(),
            )
            .image(ToastImage::new(PICTURE_URL));
    }

    content
        .input(ToastInput::text(REPLY_INPUT_ID, t!("replyPlaceholder")))
        .action(
            ToastAction::new(
                t!("replyButton"),
                ActivationArgs::new(ACTION_REPLY).with("conversationId", &conversation),
            )
            .with_activation(ActivationMode::Background)
            .with_input_id(REPLY_INPUT_ID),
        )
        .action(
            ToastAction::new(
                t!("likeButton"),
                ActivationArgs::new(ACTION_LIKE).with("conversationId", &conversation),
            )
            .with_activation(ActivationMode::Background),
        )
        .action(ToastAction::new(
            t!("viewButton"),
            ActivationArgs::new(ACTION_VIEW_IMAGE).with("imageUrl", PICTURE_URL),
        ))
}

/// Single-line toast used to confirm a background action.
pub fn confirmation_toast(message: &str) -> ToastContent {
    ToastContent::new(ToastTemplate::Generic).text(message)
}
