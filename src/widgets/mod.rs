//! Minimal widgets composed from style quads and text objects.

pub mod button;
pub mod label;

pub use button::Button;
pub use label::Label;

use crate::error::GpuError;
use crate::render::RenderContext;
use crate::stylequad::StyleChanges;
use crate::style::{DrawState, Style, Styled};
use crate::utils::Rectangle;
use std::rc::Rc;
use uuid::Uuid;

/// State every element carries: identity, style, draw state and layout.
#[derive(Debug, Clone)]
pub struct ElementState {
    id: Uuid,
    style: Rc<Style>,
    draw_state: DrawState,
    rect: Rectangle,
    dirty: bool,
    dirty_marks: u64,
}

impl ElementState {
    pub fn new(style: Rc<Style>) -> Self {
        Self {
            id: Uuid::new_v4(),
            style,
            draw_state: DrawState::Normal,
            rect: Rectangle::default(),
            dirty: true,
            dirty_marks: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn style_rc(&self) -> &Rc<Style> {
        &self.style
    }

    pub fn set_style(&mut self, style: Rc<Style>) {
        self.style = style;
        self.mark_dirty();
    }

    /// Returns true when the state actually changed.
    pub fn set_draw_state(&mut self, state: DrawState) -> bool {
        if self.draw_state == state {
            return false;
        }
        self.draw_state = state;
        self.mark_dirty();
        true
    }

    pub fn rect(&self) -> Rectangle {
        self.rect
    }

    pub fn set_rect(&mut self, rect: Rectangle) {
        self.rect = rect;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.dirty_marks += 1;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// How many times the element was marked dirty since creation.
    pub fn dirty_marks(&self) -> u64 {
        self.dirty_marks
    }

    /// Marks the element dirty once if anything changed.
    pub fn apply_changes(&mut self, changes: StyleChanges) {
        if !changes.is_empty() {
            self.mark_dirty();
        }
    }

    /// Outcome of a style pass. A failed pass leaves the element dirty so the
    /// next frame retries it.
    pub fn apply_style_result(
        &mut self,
        result: Result<StyleChanges, GpuError>,
    ) -> Result<StyleChanges, GpuError> {
        match result {
            Ok(changes) => {
                self.apply_changes(changes);
                Ok(changes)
            }
            Err(e) => {
                self.mark_dirty();
                Err(e)
            }
        }
    }
}

impl Styled for ElementState {
    fn style(&self) -> &Style {
        &self.style
    }

    fn draw_state(&self) -> DrawState {
        self.draw_state
    }
}

pub trait Element<G: RenderContext> {
    fn state(&self) -> &ElementState;

    fn id(&self) -> Uuid {
        self.state().id()
    }

    fn is_dirty(&self) -> bool {
        self.state().is_dirty()
    }

    /// Re-resolves style properties for the current draw state.
    fn update_style(&mut self, gpu: &mut G) -> Result<StyleChanges, GpuError>;

    /// Places the element and rebuilds geometry that depends on its size.
    fn layout(&mut self, gpu: &mut G, rect: Rectangle) -> Result<(), GpuError>;

    fn draw(&self, gpu: &mut G);
}
