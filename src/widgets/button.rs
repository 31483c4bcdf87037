use crate::error::{GpuError, Result};
use crate::keyboard::{Key, KeyTranslation};
use crate::render::{GpuDevice, RenderContext};
use crate::style::{DrawState, Style, Styled};
use crate::stylequad::{StyleChanges, StyleQuad};
use crate::text::FontManager;
use crate::utils::{MouseInfo, Rectangle, Size};
use crate::widgets::{Element, ElementState, Label};
use log::debug;
use std::rc::Rc;

pub struct Button<G: GpuDevice> {
    state: ElementState,
    quad: StyleQuad<G>,
    label: Label<G>,
    callback: Option<Box<dyn Fn()>>,
    focused: bool,
    pressed: bool,
}

impl<G: GpuDevice> Button<G> {
    pub fn new(
        gpu: &mut G,
        fm: Rc<FontManager<G>>,
        style: Rc<Style>,
        content: &str,
        callback: Option<Box<dyn Fn()>>,
    ) -> Result<Self> {
        Ok(Self {
            quad: StyleQuad::new(gpu)?,
            label: Label::new(gpu, fm, style.clone(), content)?,
            state: ElementState::new(style),
            callback,
            focused: false,
            pressed: false,
        })
    }

    pub fn set_callback(&mut self, callback: Option<Box<dyn Fn()>>) {
        self.callback = callback;
    }

    pub fn set_content(&mut self, gpu: &mut G, content: &str) -> std::result::Result<(), GpuError> {
        self.label.set_text(gpu, content)?;
        self.state.mark_dirty();
        Ok(())
    }

    pub fn quad(&self) -> &StyleQuad<G> {
        &self.quad
    }

    pub fn label(&self) -> &Label<G> {
        &self.label
    }

    pub fn state_mut(&mut self) -> &mut ElementState {
        &mut self.state
    }

    pub fn draw_state(&self) -> DrawState {
        self.state.draw_state()
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
        self.refresh_state(false);
    }

    /// Smallest size that fits the label with its padding.
    pub fn natural_size(&self) -> Size {
        self.label.natural_size()
    }

    fn refresh_state(&mut self, hovered: bool) {
        let state = if hovered && self.pressed {
            DrawState::Active
        } else if hovered {
            DrawState::Hover
        } else if self.focused {
            DrawState::Focus
        } else {
            DrawState::Normal
        };
        self.state.set_draw_state(state);
    }

    fn activate(&self) {
        if let Some(ref callback) = self.callback {
            callback();
        }
    }

    /// Feeds pointer state. Returns true when the button was clicked.
    pub fn handle_mouse(&mut self, mouse: MouseInfo) -> bool {
        let inside = self.state.rect().contains(mouse.mouse_pos);
        self.pressed = inside && mouse.is_lmb_down;
        self.refresh_state(inside);

        if inside && mouse.is_lmb_clicked {
            debug!("button {} clicked", self.state.id());
            self.activate();
            return true;
        }
        false
    }

    /// Enter, numpad Enter and Space activate a focused button.
    pub fn handle_key(&mut self, key: KeyTranslation) -> bool {
        if !self.focused {
            return false;
        }

        let activates = match key.key {
            Key::Enter | Key::NumpadEnter => true,
            Key::Normal => key.character == Some(' '),
            _ => false,
        };
        if activates {
            self.activate();
        }
        activates
    }
}

impl<G: RenderContext> Element<G> for Button<G> {
    fn state(&self) -> &ElementState {
        &self.state
    }

    fn update_style(&mut self, gpu: &mut G) -> std::result::Result<StyleChanges, GpuError> {
        let result = self.quad.update_style(gpu, &self.state).and_then(|quad| {
            let label = self.label.resolve_style(gpu, &self.state)?;
            Ok(quad | label)
        });
        self.state.apply_style_result(result)
    }

    fn layout(&mut self, gpu: &mut G, rect: Rectangle) -> std::result::Result<(), GpuError> {
        self.state.set_rect(rect);
        self.quad.update_geometry(gpu, &rect)?;
        self.label.place(rect);
        self.state.clear_dirty();
        Ok(())
    }

    fn draw(&self, gpu: &mut G) {
        self.quad.draw(gpu);
        self.label.draw_text(gpu);
    }
}
