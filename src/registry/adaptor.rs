// Widget adaptors: per-class description of properties, signals and hooks

use crate::document::property::PropertyValue;
use crate::document::widget::Widget;
use crate::registry::property::PropertySpec;

/// Capabilities of one widget class
///
/// Every hook has a default so simple classes only describe their data.
/// Properties and signals listed here are the class's own; inherited ones
/// come from `parent_class` and are resolved by the registry.
pub trait WidgetAdaptor: Send + Sync {
    fn class_name(&self) -> &str;

    fn parent_class(&self) -> Option<&str> {
        None
    }

    /// Prefix for generated names ("button" -> "button1")
    fn name_prefix(&self) -> String {
        self.class_name().to_lowercase()
    }

    fn properties(&self) -> &[PropertySpec] {
        &[]
    }

    fn signals(&self) -> &[String] {
        &[]
    }

    /// Toplevels live at the project root and never inside a container
    fn is_toplevel(&self) -> bool {
        false
    }

    /// `Some(0)` for non-containers, `None` for unlimited children
    fn max_children(&self) -> Option<usize> {
        Some(0)
    }

    fn accepts_child(&self, _child_class: &str) -> bool {
        true
    }

    /// Adjust a freshly built widget (defaults are already applied)
    fn post_create(&self, _widget: &mut Widget) {}
}

/// Data-driven adaptor, configured with builder methods
#[derive(Debug, Clone)]
pub struct GenericAdaptor {
    class_name: String,
    parent_class: Option<String>,
    properties: Vec<PropertySpec>,
    signals: Vec<String>,
    toplevel: bool,
    max_children: Option<usize>,
    /// Empty means any class is accepted
    allowed_children: Vec<String>,
}

impl GenericAdaptor {
    pub fn new(class_name: &str) -> Self {
        Self {
            class_name: class_name.to_string(),
            parent_class: None,
            properties: Vec::new(),
            signals: Vec::new(),
            toplevel: false,
            max_children: Some(0),
            allowed_children: Vec::new(),
        }
    }

    pub fn inherits(mut self, parent_class: &str) -> Self {
        self.parent_class = Some(parent_class.to_string());
        self
    }

    pub fn property(mut self, spec: PropertySpec) -> Self {
        self.properties.push(spec);
        self
    }

    pub fn signal(mut self, name: &str) -> Self {
        self.signals.push(name.to_string());
        self
    }

    /// Make the class a container holding at most `max` children (`None` = unlimited)
    pub fn container(mut self, max: Option<usize>) -> Self {
        self.max_children = max;
        self
    }

    pub fn toplevel(mut self) -> Self {
        self.toplevel = true;
        self
    }

    /// Restrict children to the listed classes
    pub fn only_children(mut self, classes: &[&str]) -> Self {
        self.allowed_children = classes.iter().map(|c| c.to_string()).collect();
        self
    }
}

impl WidgetAdaptor for GenericAdaptor {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn parent_class(&self) -> Option<&str> {
        self.parent_class.as_deref()
    }

    fn properties(&self) -> &[PropertySpec] {
        &self.properties
    }

    fn signals(&self) -> &[String] {
        &self.signals
    }

    fn is_toplevel(&self) -> bool {
        self.toplevel
    }

    fn max_children(&self) -> Option<usize> {
        self.max_children
    }

    fn accepts_child(&self, child_class: &str) -> bool {
        self.allowed_children.is_empty() || self.allowed_children.iter().any(|c| c == child_class)
    }
}

/// Adaptor whose text property starts out as the widget's name
///
/// A new button reads "button1", a new window is titled "window1".
#[derive(Debug, Clone)]
pub struct LabelledAdaptor {
    inner: GenericAdaptor,
    text_property: String,
}

impl LabelledAdaptor {
    pub fn new(inner: GenericAdaptor, text_property: &str) -> Self {
        Self {
            inner,
            text_property: text_property.to_string(),
        }
    }
}

impl WidgetAdaptor for LabelledAdaptor {
    fn class_name(&self) -> &str {
        self.inner.class_name()
    }

    fn parent_class(&self) -> Option<&str> {
        self.inner.parent_class()
    }

    fn properties(&self) -> &[PropertySpec] {
        self.inner.properties()
    }

    fn signals(&self) -> &[String] {
        self.inner.signals()
    }

    fn is_toplevel(&self) -> bool {
        self.inner.is_toplevel()
    }

    fn max_children(&self) -> Option<usize> {
        self.inner.max_children()
    }

    fn accepts_child(&self, child_class: &str) -> bool {
        self.inner.accepts_child(child_class)
    }

    fn post_create(&self, widget: &mut Widget) {
        widget
            .properties
            .insert(self.text_property.clone(), PropertyValue::Text(widget.name.clone()));
    }
}

/// Adaptors for the classes every project can use
pub fn builtin_adaptors() -> Vec<Box<dyn WidgetAdaptor>> {
    let widget = GenericAdaptor::new("Widget")
        .property(PropertySpec::boolean("visible", true))
        .property(PropertySpec::boolean("sensitive", true))
        .property(PropertySpec::text("tooltip_text", "").translatable())
        .signal("show")
        .signal("hide")
        .signal("destroy");

    let container = GenericAdaptor::new("Container")
        .inherits("Widget")
        .property(PropertySpec::int("border_width", 0, 65535, 0))
        .container(None);

    let window = GenericAdaptor::new("Window")
        .inherits("Container")
        .toplevel()
        .container(Some(1))
        .property(PropertySpec::text("title", "").translatable())
        .property(PropertySpec::boolean("resizable", true))
        .property(PropertySpec::int("default_width", -1, 32767, -1))
        .property(PropertySpec::int("default_height", -1, 32767, -1))
        .property(PropertySpec::enumeration(
            "window_position",
            &["none", "center", "mouse"],
            "none",
        ))
        .signal("delete-event");

    let dialog = GenericAdaptor::new("Dialog")
        .inherits("Window")
        .toplevel()
        .container(Some(1))
        .property(PropertySpec::boolean("modal", false))
        .signal("response");

    let vbox = GenericAdaptor::new("Box")
        .inherits("Container")
        .container(None)
        .property(PropertySpec::enumeration(
            "orientation",
            &["horizontal", "vertical"],
            "vertical",
        ))
        .property(PropertySpec::int("spacing", 0, 10000, 0))
        .property(PropertySpec::boolean("homogeneous", false));

    let button_box = GenericAdaptor::new("ButtonBox")
        .inherits("Box")
        .container(None)
        .only_children(&["Button", "ToggleButton", "CheckButton"])
        .property(PropertySpec::enumeration(
            "layout_style",
            &["spread", "edge", "start", "end", "center"],
            "end",
        ));

    let grid = GenericAdaptor::new("Grid")
        .inherits("Container")
        .container(None)
        .property(PropertySpec::int("row_spacing", 0, 10000, 0))
        .property(PropertySpec::int("column_spacing", 0, 10000, 0));

    let frame = GenericAdaptor::new("Frame")
        .inherits("Container")
        .container(Some(1))
        .property(PropertySpec::text("label", "").translatable());

    let button = GenericAdaptor::new("Button")
        .inherits("Widget")
        .property(PropertySpec::text("label", "").translatable())
        .property(PropertySpec::boolean("use_underline", false))
        .property(PropertySpec::enumeration("relief", &["normal", "none"], "normal"))
        .signal("clicked");

    let toggle = GenericAdaptor::new("ToggleButton")
        .inherits("Button")
        .property(PropertySpec::boolean("active", false))
        .signal("toggled");

    let check = GenericAdaptor::new("CheckButton").inherits("ToggleButton");

    let label = GenericAdaptor::new("Label")
        .inherits("Widget")
        .property(PropertySpec::text("label", "").translatable())
        .property(PropertySpec::boolean("wrap", false))
        .property(PropertySpec::float("xalign", 0.0, 1.0, 0.5))
        .property(PropertySpec::enumeration(
            "justify",
            &["left", "right", "center", "fill"],
            "left",
        ));

    let entry = GenericAdaptor::new("Entry")
        .inherits("Widget")
        .property(PropertySpec::text("text", ""))
        .property(PropertySpec::boolean("editable", true))
        .property(PropertySpec::boolean("visibility", true))
        .property(PropertySpec::int("max_length", 0, 65535, 0))
        .signal("changed")
        .signal("activate");

    let image = GenericAdaptor::new("Image")
        .inherits("Widget")
        .property(PropertySpec::text("icon_name", ""))
        .property(PropertySpec::int("pixel_size", -1, 1024, -1));

    vec![
        Box::new(widget),
        Box::new(container),
        Box::new(LabelledAdaptor::new(window, "title")),
        Box::new(LabelledAdaptor::new(dialog, "title")),
        Box::new(vbox),
        Box::new(button_box),
        Box::new(grid),
        Box::new(LabelledAdaptor::new(frame, "label")),
        Box::new(LabelledAdaptor::new(button, "label")),
        Box::new(LabelledAdaptor::new(toggle, "label")),
        Box::new(LabelledAdaptor::new(check, "label")),
        Box::new(LabelledAdaptor::new(label, "label")),
        Box::new(entry),
        Box::new(image),
    ]
}
