use quick_xml::escape::escape;
use std::fmt::Write as _;

/// Visual template of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastTemplate {
    #[default]
    Generic,
}

impl ToastTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastTemplate::Generic => "ToastGeneric",
        }
    }
}

/// How the platform reacts when a button is clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivationMode {
    /// Brings the owning application forward
    #[default]
    Foreground,
    /// Invokes the activation callback without touching any window
    Background,
}

impl ActivationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivationMode::Foreground => "foreground",
            ActivationMode::Background => "background",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImagePlacement {
    #[default]
    Inline,
    AppLogoOverride,
    Hero,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastImage {
    pub src: String,
    pub placement: ImagePlacement,
    pub circle_crop: bool,
}

impl ToastImage {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            placement: ImagePlacement::Inline,
            circle_crop: false,
        }
    }

    pub fn with_placement(mut self, placement: ImagePlacement) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_circle_crop(mut self) -> Self {
        self.circle_crop = true;
        self
    }
}

/// Free-text input rendered inside the toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastInput {
    pub id: String,
    pub placeholder: String,
    pub title: Option<String>,
}

impl ToastInput {
    pub fn text(id: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            placeholder: placeholder.into(),
            title: None,
        }
    }
}

/// A button and the argument string handed back when it is clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastAction {
    pub label: String,
    pub arguments: String,
    pub activation: ActivationMode,
    /// Places the button next to the input with this id
    pub input_id: Option<String>,
}

impl ToastAction {
    pub fn new(label: impl Into<String>, arguments: impl ToString) -> Self {
        Self {
            label: label.into(),
            arguments: arguments.to_string(),
            activation: ActivationMode::Foreground,
            input_id: None,
        }
    }

    pub fn with_activation(mut self, activation: ActivationMode) -> Self {
        self.activation = activation;
        self
    }

    pub fn with_input_id(mut self, input_id: impl Into<String>) -> Self {
        self.input_id = Some(input_id.into());
        self
    }
}

/// Platform-independent toast document.
///
/// Built once, rendered to the toast XML schema by [`ToastContent::to_xml`] and handed
/// to the notification platform as-is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToastContent {
    pub template: ToastTemplate,
    pub texts: Vec<String>,
    pub images: Vec<ToastImage>,
    pub launch: Option<String>,
    pub inputs: Vec<ToastInput>,
    pub actions: Vec<ToastAction>,
    pub tag: Option<String>,
    pub group: Option<String>,
}

impl ToastContent {
    pub fn new(template: ToastTemplate) -> Self {
        Self {
            template,
            ..Default::default()
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.texts.push(text.into());
        self
    }

    pub fn image(mut self, image: ToastImage) -> Self {
        self.images.push(image);
        self
    }

    /// Argument delivered when the toast body itself is clicked.
    pub fn launch(mut self, arguments: impl ToString) -> Self {
        self.launch = Some(arguments.to_string());
        self
    }

    pub fn input(mut self, input: ToastInput) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn action(mut self, action: ToastAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Renders the toast schema document.
    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<toast");
        if let Some(launch) = &self.launch {
            let _ = write!(xml, r#" launch="{}""#, escape(launch.as_str()));
        }
        xml.push('>');

        let _ = write!(
            xml,
            r#"<visual><binding template="{}">"#,
            self.template.as_str()
        );
        for text in &self.texts {
            let _ = write!(xml, "<text>{}</text>", escape(text.as_str()));
        }
        for image in &self.images {
            xml.push_str("<image");
            match image.placement {
                ImagePlacement::Inline => {}
                ImagePlacement::AppLogoOverride => xml.push_str(r#" placement="appLogoOverride""#),
                ImagePlacement::Hero => xml.push_str(r#" placement="hero""#),
            }
            if image.circle_crop {
                xml.push_str(r#" hint-crop="circle""#);
            }
            let _ = write!(xml, r#" src="{}"/>"#, escape(image.src.as_str()));
        }
        xml.push_str("</binding></visual>");

        if !self.inputs.is_empty() || !self.actions.is_empty() {
            xml.push_str("<actions>");
            for input in &self.inputs {
                let _ = write!(
                    xml,
                    r#"<input id="{}" type="text" placeHolderContent="{}""#,
                    escape(input.id.as_str()),
                    escape(input.placeholder.as_str())
                );
                if let Some(title) = &input.title {
                    let _ = write!(xml, r#" title="{}""#, escape(title.as_str()));
                }
                xml.push_str("/>");
            }
            for action in &self.actions {
                let _ = write!(
                    xml,
                    r#"<action content="{}" arguments="{}" activationType="{}""#,
                    escape(action.label.as_str()),
                    escape(action.arguments.as_str()),
                    action.activation.as_str()
                );
                if let Some(input_id) = &action.input_id {
                    let _ = write!(xml, r#" hint-inputId="{}""#, escape(input_id.as_str()));
                }
                xml.push_str("/>");
            }
            xml.push_str("</actions>");
        }

        xml.push_str("</toast>");
        xml
    }
}
