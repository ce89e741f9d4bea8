use pressroom_editor::{
    render_html, view_document, Block, BlockKind, Bounds, Canvas, Container, DragContext,
    FieldEdit, Location, RenderContext, SyncOutcome,
};
use serde_json::json;
use std::fmt::Display;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(context: &str, err: impl Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, err))
}

fn parse_container(raw: &str) -> Result<Container, JsValue> {
    serde_json::from_str(raw).map_err(|e| js_error("Invalid container", e))
}

/// Editor state owned by the page: one canvas and its drag controller.
///
/// The host re-renders whenever `version` moves.
#[wasm_bindgen]
pub struct EditorHandle {
    canvas: Canvas,
    drag: DragContext,
}

#[wasm_bindgen]
impl EditorHandle {
    /// Mount stored content; unreadable content becomes an empty canvas
    #[wasm_bindgen(constructor)]
    pub fn new(content: &str) -> EditorHandle {
        EditorHandle {
            canvas: Canvas::mount(content),
            drag: DragContext::new(),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn version(&self) -> u64 {
        self.canvas.version()
    }

    #[wasm_bindgen(js_name = addBlock)]
    pub fn add_block(&mut self, kind: &str) -> Result<usize, JsValue> {
        let kind: BlockKind = kind.parse().map_err(|e| js_error("Add failed", e))?;
        self.canvas
            .add_block(kind)
            .map_err(|e| js_error("Add failed", e))
    }

    /// Replace the props of the top-level block at `index`, keeping its type
    #[wasm_bindgen(js_name = updateBlock)]
    pub fn update_block(&mut self, index: usize, props: &str) -> Result<(), JsValue> {
        let kind = self
            .canvas
            .document()
            .content
            .get(index)
            .map(Block::kind)
            .ok_or_else(|| js_error("Update failed", format!("no block at {}", index)))?;

        let props: serde_json::Value =
            serde_json::from_str(props).map_err(|e| js_error("Invalid props", e))?;
        let block: Block = serde_json::from_value(json!({ "type": kind.as_str(), "props": props }))
            .map_err(|e| js_error("Invalid props", e))?;

        self.canvas
            .update_block(index, block)
            .map_err(|e| js_error("Update failed", e))
    }

    /// Apply a single control edit, e.g. `{"field": "text", "value": "Hi"}`
    #[wasm_bindgen(js_name = editField)]
    pub fn edit_field(&mut self, location: &str, edit: &str) -> Result<(), JsValue> {
        let location: Location =
            serde_json::from_str(location).map_err(|e| js_error("Invalid location", e))?;
        let edit: FieldEdit = serde_json::from_str(edit).map_err(|e| js_error("Invalid edit", e))?;

        self.canvas
            .edit(location, edit)
            .map_err(|e| js_error("Edit failed", e))
    }

    #[wasm_bindgen(js_name = deleteBlock)]
    pub fn delete_block(&mut self, index: usize) -> Result<(), JsValue> {
        self.canvas
            .delete_block(index)
            .map(|_| ())
            .map_err(|e| js_error("Delete failed", e))
    }

    #[wasm_bindgen(js_name = moveBlock)]
    pub fn move_block(&mut self, from: usize, to: usize) -> Result<(), JsValue> {
        self.canvas
            .move_block(from, to)
            .map_err(|e| js_error("Move failed", e))
    }

    #[wasm_bindgen(js_name = setColumnCount)]
    pub fn set_column_count(&mut self, index: usize, count: u8) -> Result<(), JsValue> {
        self.canvas
            .set_column_count(index, count)
            .map_err(|e| js_error("Column change failed", e))
    }

    /// Reconcile with content pushed by the host; returns `echo`,
    /// `unchanged` or `reset`
    #[wasm_bindgen(js_name = syncExternal)]
    pub fn sync_external(&mut self, content: &str) -> String {
        match self.canvas.sync_external(content) {
            SyncOutcome::Echo => "echo",
            SyncOutcome::Unchanged => "unchanged",
            SyncOutcome::Reset => "reset",
        }
        .to_string()
    }

    /// Start a drag from the encoded transfer payload; false if it is not ours
    #[wasm_bindgen(js_name = dragStart)]
    pub fn drag_start(&mut self, payload: &str) -> bool {
        self.drag.begin_encoded(payload)
    }

    /// Returns the indicator edge (`top` or `bottom`)
    #[wasm_bindgen(js_name = dragOverBlock)]
    pub fn drag_over_block(
        &mut self,
        container: &str,
        index: usize,
        top: f64,
        height: f64,
        pointer_y: f64,
    ) -> Result<String, JsValue> {
        let container = parse_container(container)?;
        let edge = self
            .drag
            .over_block(container, index, Bounds::new(top, height), pointer_y);
        serde_json::to_value(edge)
            .ok()
            .and_then(|value| value.as_str().map(str::to_string))
            .ok_or_else(|| js_error("Drag failed", "unencodable edge"))
    }

    #[wasm_bindgen(js_name = dragOverZone)]
    pub fn drag_over_zone(&mut self, container: &str) -> Result<(), JsValue> {
        let container = parse_container(container)?;
        self.drag.over_zone(container);
        Ok(())
    }

    #[wasm_bindgen(js_name = dragLeave)]
    pub fn drag_leave(&mut self, container: &str, index: usize) -> Result<(), JsValue> {
        let container = parse_container(container)?;
        self.drag.leave(container, index);
        Ok(())
    }

    #[wasm_bindgen(js_name = dragCancel)]
    pub fn drag_cancel(&mut self) {
        self.drag.cancel();
    }

    /// Complete the drag; returns the landing location as JSON, if any
    pub fn drop(&mut self) -> Option<String> {
        let landed = self.drag.drop(&mut self.canvas)?;
        serde_json::to_string(&landed).ok()
    }

    /// Editable view tree for the current state
    pub fn view(&self) -> Result<String, JsValue> {
        let ctx = RenderContext {
            drag: Some(&self.drag),
            uploading: None,
        };
        serde_json::to_string(&view_document(self.canvas.document(), ctx))
            .map_err(|e| js_error("Serialization error", e))
    }

    #[wasm_bindgen(js_name = toJson)]
    pub fn to_json(&self) -> Result<String, JsValue> {
        self.canvas
            .serialize()
            .map_err(|e| js_error("Serialization error", e))
    }

    #[wasm_bindgen(js_name = toHtml)]
    pub fn to_html(&self) -> String {
        render_html(self.canvas.document())
    }

    pub fn undo(&mut self) -> Result<bool, JsValue> {
        self.canvas.undo().map_err(|e| js_error("Undo failed", e))
    }

    pub fn redo(&mut self) -> Result<bool, JsValue> {
        self.canvas.redo().map_err(|e| js_error("Redo failed", e))
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.canvas.history().can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.canvas.history().can_redo()
    }
}

/// Block types offered by the palette, as JSON `[{"type", "label"}]`
#[wasm_bindgen(js_name = blockPalette)]
pub fn block_palette() -> String {
    let entries: Vec<_> = BlockKind::ALL
        .iter()
        .map(|kind| json!({ "type": kind.as_str(), "label": kind.label() }))
        .collect();
    serde_json::Value::Array(entries).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pressroom_editor::DragPayload;

    #[test]
    fn test_edit_and_export() {
        let mut editor = EditorHandle::new("");
        assert_eq!(editor.version(), 0);

        let index = editor.add_block("heading").unwrap();
        editor
            .update_block(index, r#"{"text": "Launch day", "level": 1}"#)
            .unwrap();

        assert_eq!(editor.version(), 2);
        assert!(editor.to_html().contains("<h1>Launch day</h1>"));
        assert!(editor.to_json().unwrap().contains("Launch day"));
    }

    #[test]
    fn test_own_output_is_an_echo() {
        let mut editor = EditorHandle::new("");
        editor.add_block("paragraph").unwrap();
        let emitted = editor.to_json().unwrap();

        assert_eq!(editor.sync_external(&emitted), "echo");
        assert_eq!(editor.version(), 1);
    }

    #[test]
    fn test_palette_drop_into_column() {
        let mut editor = EditorHandle::new("");
        editor.add_block("columns").unwrap();

        let payload = DragPayload::NewBlock {
            kind: BlockKind::Image,
        }
        .encode();
        assert!(editor.drag_start(&payload));
        editor
            .drag_over_zone(r#"{"kind": "column", "block": 0, "column": 1}"#)
            .unwrap();
        assert!(editor.view().unwrap().contains("\"active\":true"));

        let landed = editor.drop().unwrap();
        assert_eq!(landed, serde_json::to_string(&Location::column(0, 1, 0)).unwrap());
        assert!(editor.can_undo());

        assert!(editor.undo().unwrap());
        assert!(editor.can_redo());
    }

    #[test]
    fn test_drag_over_block_reports_edge() {
        let mut editor = EditorHandle::new("");
        editor.add_block("paragraph").unwrap();
        editor.drag_start(&DragPayload::NewBlock { kind: BlockKind::Heading }.encode());

        let edge = editor
            .drag_over_block(r#"{"kind": "canvas"}"#, 0, 100.0, 40.0, 130.0)
            .unwrap();
        assert_eq!(edge, "bottom");
    }

    #[test]
    fn test_palette_lists_every_kind() {
        let palette: serde_json::Value = serde_json::from_str(&block_palette()).unwrap();
        assert_eq!(palette.as_array().unwrap().len(), BlockKind::ALL.len());
    }
}
