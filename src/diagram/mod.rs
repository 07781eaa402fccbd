/// Diagram layer: name → index resolution and flow layout geometry.
///
/// The pipeline hands over a [`crate::data::model::FlowGraph`] of names;
/// everything positional (columns, node rectangles, ribbon endpoints) is
/// computed here and consumed by `ui::diagram`.

pub mod layout;
