use crate::error::{GpuError, Result};
use crate::render::{GpuDevice, RenderContext};
use crate::stylequad::StyleChanges;
use crate::style::{Style, Styled};
use crate::text::{FontManager, TextObject};
use crate::utils::{Color, Position, Rectangle, Size};
use crate::widgets::{Element, ElementState};
use log::warn;
use std::rc::Rc;

/// A line of text centred in its rectangle.
pub struct Label<G: GpuDevice> {
    state: ElementState,
    fm: Rc<FontManager<G>>,
    text: TextObject<G>,
    // resolved by the last style pass; drawing uses it as is
    fg_color: Option<Color>,
    text_pos: Position,
}

impl<G: GpuDevice> Label<G> {
    pub fn new(gpu: &mut G, fm: Rc<FontManager<G>>, style: Rc<Style>, text: &str) -> Result<Self> {
        let text = TextObject::new(gpu, fm.clone(), None, Some(text.as_bytes()))?;
        Ok(Self {
            state: ElementState::new(style),
            fm,
            text,
            fg_color: None,
            text_pos: Position::default(),
        })
    }

    pub fn state_mut(&mut self) -> &mut ElementState {
        &mut self.state
    }

    pub fn text_object(&self) -> &TextObject<G> {
        &self.text
    }

    pub fn set_text(&mut self, gpu: &mut G, text: &str) -> std::result::Result<(), GpuError> {
        self.text.update(gpu, text)?;
        self.center_text();
        self.state.mark_dirty();
        Ok(())
    }

    /// Text extent plus padding.
    pub fn natural_size(&self) -> Size {
        Size {
            width: (self.text.width() + self.text.xpad()) as f32,
            height: (self.text.height() + self.text.ypad()) as f32,
        }
    }

    pub fn text_position(&self) -> Position {
        self.text_pos
    }

    fn center_text(&mut self) {
        let rect = self.state.rect();
        self.text_pos = Position {
            x: (rect.x + (rect.width - self.text.width() as f32) / 2.0).floor(),
            y: (rect.y + (rect.height - self.text.height() as f32) / 2.0).floor(),
        };
    }

    pub(crate) fn resolve_style(
        &mut self,
        gpu: &mut G,
        owner: &impl Styled,
    ) -> std::result::Result<StyleChanges, GpuError> {
        let mut changes = StyleChanges::NONE;
        let state = owner.draw_state();

        let fg = owner.style().color(state, "color");
        if fg != self.fg_color {
            self.fg_color = fg;
            changes.insert(StyleChanges::FG_COLOR);
        }

        if let Some(slot) = owner.style().font(state, "font") {
            match self.fm.font(slot) {
                Some(font) if !Rc::ptr_eq(&font, self.text.font()) => {
                    self.text.set_font(gpu, font)?;
                    self.center_text();
                    changes.insert(StyleChanges::FONT);
                }
                Some(_) => {}
                None => warn!("style {:?} names missing font slot {}", owner.style().name(), slot),
            }
        }

        Ok(changes)
    }

    pub(crate) fn place(&mut self, rect: Rectangle) {
        self.state.set_rect(rect);
        self.center_text();
    }
}

impl<G: RenderContext> Label<G> {
    /// Draws with the colour resolved by the last style pass, or the font
    /// manager's default before the first one.
    pub(crate) fn draw_text(&self, gpu: &mut G) {
        let color = self.fg_color.unwrap_or(self.fm.default_fg());
        self.text
            .render_colored(gpu, color, self.text_pos.x, self.text_pos.y);
    }
}

impl<G: RenderContext> Element<G> for Label<G> {
    fn state(&self) -> &ElementState {
        &self.state
    }

    fn update_style(&mut self, gpu: &mut G) -> std::result::Result<StyleChanges, GpuError> {
        let owner = self.state.clone();
        let result = self.resolve_style(gpu, &owner);
        self.state.apply_style_result(result)
    }

    fn layout(&mut self, _gpu: &mut G, rect: Rectangle) -> std::result::Result<(), GpuError> {
        self.place(rect);
        self.state.clear_dirty();
        Ok(())
    }

    fn draw(&self, gpu: &mut G) {
        self.draw_text(gpu);
    }
}
