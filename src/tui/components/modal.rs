//! Centered modal box drawn over the dashboard.

use iocraft::prelude::*;

use crate::tui::theme::theme;

/// Backdrop behind every modal
pub const MODAL_BACKDROP: Color = Color::Rgb {
    r: 30,
    g: 30,
    b: 30,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModalTone {
    #[default]
    Normal,
    Warning,
    Danger,
}

impl ModalTone {
    pub fn color(&self) -> Color {
        match self {
            ModalTone::Normal => theme().border_focused,
            ModalTone::Warning => Color::Yellow,
            ModalTone::Danger => Color::Red,
        }
    }
}

#[derive(Default, Props)]
pub struct ModalProps<'a> {
    pub title: String,
    pub tone: ModalTone,
    /// Columns; defaults to 64
    pub width: Option<u32>,
    pub footer_text: Option<String>,
    pub children: Vec<AnyElement<'a>>,
}

/// Full-screen overlay with a bordered box in the middle.
#[component]
pub fn Modal<'a>(props: &mut ModalProps<'a>) -> impl Into<AnyElement<'a>> {
    let theme = theme();
    let border_color = props.tone.color();
    let footer = props.footer_text.clone();

    element! {
        View(
            width: 100pct,
            height: 100pct,
            position: Position::Absolute,
            top: 0,
            left: 0,
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            background_color: MODAL_BACKDROP,
        ) {
            View(
                width: props.width.unwrap_or(64),
                background_color: theme.background,
                border_style: BorderStyle::Double,
                border_color: border_color,
                padding: 1,
                flex_direction: FlexDirection::Column,
            ) {
                View(
                    width: 100pct,
                    padding_bottom: 1,
                    border_edges: Edges::Bottom,
                    border_style: BorderStyle::Single,
                    border_color: theme.border,
                ) {
                    Text(content: props.title.clone(), color: border_color, weight: Weight::Bold)
                }
                View(width: 100pct, flex_direction: FlexDirection::Column) {
                    #(std::mem::take(&mut props.children))
                }
                #(footer.map(|text| element! {
                    View(
                        width: 100pct,
                        padding_top: 1,
                        border_edges: Edges::Top,
                        border_style: BorderStyle::Single,
                        border_color: theme.border,
                    ) {
                        Text(content: text, color: theme.text_dimmed)
                    }
                }))
            }
        }
    }
}
