use std::rc::Rc;
use tuber::backend::RecordingGpu;
use tuber::render::{Primitive, Shader};
use tuber::style::{BorderWidths, DrawState, PropertyValue, Style, Styled, TextureDefinition};
use tuber::stylequad::{
    border_tex_coords, grid_vertices, StyleChanges, StyleQuad, BORDER_INDICES, OUTLINE_INDICES,
    SOLID_INDICES,
};
use tuber::utils::{Color, Position, Rectangle, IDENTITY};
use tuber::GpuError;

struct Owner {
    style: Style,
    state: DrawState,
}

impl Owner {
    fn new(style: Style) -> Self {
        Self {
            style,
            state: DrawState::Normal,
        }
    }
}

impl Styled for Owner {
    fn style(&self) -> &Style {
        &self.style
    }

    fn draw_state(&self) -> DrawState {
        self.state
    }
}

fn texture(width: u32, height: u32, border: u32, fill: bool) -> Rc<TextureDefinition> {
    Rc::new(TextureDefinition::from_bgra(
        width,
        height,
        vec![255; (width * height * 4) as usize],
        BorderWidths::uniform(border),
        fill,
    ))
}

fn red() -> Color {
    Color::rgba(1.0, 0.0, 0.0, 1.0)
}

#[test]
fn second_style_pass_reports_no_changes() {
    let mut gpu = RecordingGpu::new();
    let mut quad = StyleQuad::new(&mut gpu).unwrap();

    let mut style = Style::new("box");
    style.set(DrawState::Normal, "background-color", PropertyValue::Color(red()));
    style.set(DrawState::Normal, "border-color", PropertyValue::Color(Color::WHITE));
    let owner = Owner::new(style);

    let first = quad.update_style(&mut gpu, &owner).unwrap();
    assert_eq!(first, StyleChanges::BG_COLOR | StyleChanges::BORDER_COLOR);

    let second = quad.update_style(&mut gpu, &owner).unwrap();
    assert!(second.is_empty());
}

#[test]
fn state_change_reports_only_differing_properties() {
    let mut gpu = RecordingGpu::new();
    let mut quad = StyleQuad::new(&mut gpu).unwrap();

    let mut style = Style::new("box");
    style.set(DrawState::Normal, "background-color", PropertyValue::Color(red()));
    style.set(DrawState::Normal, "color", PropertyValue::Color(Color::BLACK));
    style.set(DrawState::Hover, "color", PropertyValue::Color(Color::WHITE));
    let mut owner = Owner::new(style);
    quad.update_style(&mut gpu, &owner).unwrap();

    owner.state = DrawState::Hover;
    let changes = quad.update_style(&mut gpu, &owner).unwrap();
    assert_eq!(changes, StyleChanges::FG_COLOR);
    assert_eq!(quad.fg_color(), Some(Color::WHITE));
}

#[test]
fn removing_a_property_is_a_change() {
    let mut gpu = RecordingGpu::new();
    let mut quad = StyleQuad::new(&mut gpu).unwrap();

    let mut style = Style::new("box");
    style.set(DrawState::Normal, "border-color", PropertyValue::Color(red()));
    let mut owner = Owner::new(style);
    quad.update_style(&mut gpu, &owner).unwrap();

    owner.style.remove(DrawState::Normal, "border-color");
    let changes = quad.update_style(&mut gpu, &owner).unwrap();
    assert_eq!(changes, StyleChanges::BORDER_COLOR);
    assert!(quad.properties().border_color.is_none());
}

#[test]
fn same_border_image_uploads_once() {
    let mut gpu = RecordingGpu::new();
    let mut quad = StyleQuad::new(&mut gpu).unwrap();
    let def = texture(16, 16, 4, false);

    quad.set_border_image(&mut gpu, Some(def.clone())).unwrap();
    quad.set_border_image(&mut gpu, Some(def.clone())).unwrap();
    assert_eq!(gpu.stats().texture_uploads, 1);

    // an equal but distinct definition is a different texture
    let other = texture(16, 16, 4, false);
    let weak = Rc::downgrade(&def);
    drop(def);
    quad.set_border_image(&mut gpu, Some(other.clone())).unwrap();
    assert_eq!(gpu.stats().texture_uploads, 2);
    assert!(weak.upgrade().is_none());
    assert!(Rc::ptr_eq(quad.border_image().unwrap(), &other));
}

#[test]
fn style_pass_loads_border_image_once() {
    let mut gpu = RecordingGpu::new();
    let mut quad = StyleQuad::new(&mut gpu).unwrap();

    let mut style = Style::new("frame");
    style.set(
        DrawState::Normal,
        "border-image",
        PropertyValue::Texture(texture(12, 12, 3, true)),
    );
    let owner = Owner::new(style);

    let changes = quad.update_style(&mut gpu, &owner).unwrap();
    assert_eq!(changes, StyleChanges::BORDER_IMAGE);
    quad.update_style(&mut gpu, &owner).unwrap();
    quad.update_style(&mut gpu, &owner).unwrap();
    assert_eq!(gpu.stats().texture_uploads, 1);
}

#[test]
fn clearing_the_border_image_uploads_an_empty_texture() {
    let mut gpu = RecordingGpu::new();
    let mut quad = StyleQuad::new(&mut gpu).unwrap();

    quad.set_border_image(&mut gpu, Some(texture(8, 8, 2, false)))
        .unwrap();
    quad.set_border_image(&mut gpu, None).unwrap();
    assert_eq!(gpu.stats().texture_uploads, 2);
    assert!(quad.border_image().is_none());

    quad.set_border_image(&mut gpu, None).unwrap();
    assert_eq!(gpu.stats().texture_uploads, 2);
}

#[test]
fn border_grid_matches_thickness() {
    let rect = Rectangle::new(10.0, 20.0, 100.0, 50.0);
    let border = BorderWidths {
        top: 3,
        right: 4,
        bottom: 5,
        left: 6,
    };
    let v = grid_vertices(&rect, Some(&border));

    // top-left corner cell
    assert_eq!(v[2][0] - v[0][0], 6.0);
    assert_eq!(v[2][1] - v[0][1], 3.0);
    // bottom-right corner cell
    assert_eq!(v[14][0] - v[12][0], 4.0);
    assert_eq!(v[14][1] - v[12][1], 5.0);
    // centre cell
    assert_eq!(v[7][0] - v[2][0], 100.0 - 6.0 - 4.0);
    assert_eq!(v[9][1] - v[2][1], 50.0 - 3.0 - 5.0);
    // centre-relative
    assert_eq!(v[0], [-50.0, -25.0]);
    assert_eq!(v[14], [50.0, 25.0]);
}

#[test]
fn plain_grid_only_sets_fill_corners() {
    let rect = Rectangle::new(0.0, 0.0, 40.0, 20.0);
    let v = grid_vertices(&rect, None);

    assert_eq!(v[2], [-20.0, -10.0]);
    assert_eq!(v[7], [20.0, -10.0]);
    assert_eq!(v[12], [20.0, 10.0]);
    assert_eq!(v[9], [-20.0, 10.0]);
    for (i, p) in v.iter().enumerate() {
        if ![2, 7, 9, 12].contains(&i) {
            assert_eq!(*p, [0.0, 0.0], "point {}", i);
        }
    }
}

#[test]
fn geometry_update_centres_the_quad() {
    let mut gpu = RecordingGpu::new();
    let mut quad = StyleQuad::new(&mut gpu).unwrap();

    quad.update_geometry(&mut gpu, &Rectangle::new(10.0, 20.0, 100.0, 50.0))
        .unwrap();
    assert_eq!(quad.offset(), Position { x: 60.0, y: 45.0 });
}

#[test]
fn draws_layers_in_fixed_order() {
    let mut gpu = RecordingGpu::new();
    let mut quad = StyleQuad::new(&mut gpu).unwrap();

    let border = texture(16, 8, 2, true);
    let background = texture(32, 32, 0, false);
    let mut style = Style::new("panel");
    style.set(DrawState::Normal, "background-color", PropertyValue::Color(red()));
    style.set(DrawState::Normal, "border-color", PropertyValue::Color(Color::WHITE));
    style.set(DrawState::Normal, "border-image", PropertyValue::Texture(border));
    style.set(
        DrawState::Normal,
        "background-image",
        PropertyValue::Texture(background),
    );
    let owner = Owner::new(style);

    quad.update_style(&mut gpu, &owner).unwrap();
    quad.update_geometry(&mut gpu, &Rectangle::new(0.0, 0.0, 64.0, 32.0))
        .unwrap();
    quad.draw(&mut gpu);

    let draws = gpu.draws();
    assert_eq!(draws.len(), 5);
    assert!(draws.iter().all(|d| d.shader == Some(Shader::StyleQuad)));
    assert!(draws.iter().all(|d| d.position == (32.0, 16.0)));

    // background colour
    assert_eq!(draws[0].primitive, Primitive::TriangleStrip);
    assert_eq!(draws[0].indices, SOLID_INDICES);
    assert_eq!(draws[0].color, red());
    assert_eq!(draws[0].texture, None);
    assert_eq!(draws[0].texture_size, (0.0, 0.0));

    // background image
    assert_eq!(draws[1].indices, SOLID_INDICES);
    assert!(draws[1].texture.is_some());
    assert_eq!(draws[1].texture_size, (32.0, 32.0));

    // border image, then its fill
    assert_eq!(draws[2].primitive, Primitive::Triangles);
    assert_eq!(draws[2].indices, BORDER_INDICES);
    assert_eq!(draws[2].texture_size, (16.0, 8.0));
    assert_eq!(draws[3].primitive, Primitive::TriangleStrip);
    assert_eq!(draws[3].texture, draws[2].texture);
    assert_ne!(draws[2].texture, draws[1].texture);

    // outline on top, untextured
    assert_eq!(draws[4].primitive, Primitive::LineLoop);
    assert_eq!(draws[4].indices, OUTLINE_INDICES);
    assert_eq!(draws[4].color, Color::WHITE);
    assert_eq!(draws[4].texture, None);
    assert_eq!(draws[4].texture_size, (0.0, 0.0));
}

#[test]
fn border_image_without_fill_skips_the_centre() {
    let mut gpu = RecordingGpu::new();
    let mut quad = StyleQuad::new(&mut gpu).unwrap();

    quad.set_border_image(&mut gpu, Some(texture(8, 8, 2, false)))
        .unwrap();
    quad.update_geometry(&mut gpu, &Rectangle::new(0.0, 0.0, 20.0, 20.0))
        .unwrap();
    quad.draw(&mut gpu);

    let draws = gpu.draws();
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].indices, BORDER_INDICES);
    assert!(draws[0].tex_coord_buffer.is_some());
}

#[test]
fn empty_style_draws_nothing() {
    let mut gpu = RecordingGpu::new();
    let quad = StyleQuad::new(&mut gpu).unwrap();
    quad.draw(&mut gpu);
    assert!(gpu.draws().is_empty());
}

#[test]
fn modelview_is_applied_to_every_layer() {
    let mut gpu = RecordingGpu::new();
    let mut quad = StyleQuad::new(&mut gpu).unwrap();

    let mut style = Style::new("box");
    style.set(DrawState::Normal, "background-color", PropertyValue::Color(red()));
    style.set(DrawState::Normal, "border-color", PropertyValue::Color(red()));
    quad.update_style(&mut gpu, &Owner::new(style)).unwrap();

    let mut m = IDENTITY;
    m[3][0] = 5.0;
    quad.draw_with_modelview(&mut gpu, &m);
    assert_eq!(gpu.draws().len(), 2);
    assert!(gpu.draws().iter().all(|d| d.modelview == m));

    // a plain draw starts from a reset state
    gpu.take_draws();
    quad.draw(&mut gpu);
    assert!(gpu.draws().iter().all(|d| d.modelview == IDENTITY));
}

#[test]
fn failed_upload_keeps_previous_image() {
    let mut gpu = RecordingGpu::new();
    let mut quad = StyleQuad::new(&mut gpu).unwrap();
    let first = texture(8, 8, 2, false);
    quad.set_border_image(&mut gpu, Some(first.clone())).unwrap();

    gpu.fail_next_upload();
    let err = quad.set_border_image(&mut gpu, Some(texture(8, 8, 1, false)));
    assert!(matches!(err, Err(GpuError::Allocation { .. })));
    assert!(Rc::ptr_eq(quad.border_image().unwrap(), &first));
}

#[test]
fn failed_coordinate_upload_is_retried_with_the_texture() {
    let mut gpu = RecordingGpu::new();
    let mut quad = StyleQuad::new(&mut gpu).unwrap();
    let def = texture(8, 8, 2, false);

    // the texture upload goes through, the coordinate buffer write fails
    gpu.fail_buffer_write_after(0);
    assert!(quad.set_border_image(&mut gpu, Some(def.clone())).is_err());
    assert!(quad.border_image().is_none());

    let writes = gpu.stats().buffer_writes;
    quad.set_border_image(&mut gpu, Some(def.clone())).unwrap();
    assert!(Rc::ptr_eq(quad.border_image().unwrap(), &def));
    assert_eq!(gpu.stats().buffer_writes, writes + 1);

    quad.update_geometry(&mut gpu, &Rectangle::new(0.0, 0.0, 20.0, 20.0))
        .unwrap();
    quad.draw(&mut gpu);
    let coords = gpu.draws()[0].tex_coord_buffer.unwrap();
    assert_eq!(gpu.written_points(coords).unwrap(), border_tex_coords(&def));
}

#[test]
fn failed_background_coordinates_leave_no_image() {
    let mut gpu = RecordingGpu::new();
    let mut quad = StyleQuad::new(&mut gpu).unwrap();
    let def = texture(4, 4, 0, false);

    gpu.fail_buffer_write_after(0);
    assert!(quad.set_background_image(&mut gpu, Some(def.clone())).is_err());
    assert!(quad.background_image().is_none());

    quad.set_background_image(&mut gpu, Some(def)).unwrap();
    assert!(quad.background_image().is_some());
}

#[test]
fn border_coordinates_follow_each_side() {
    let def = Rc::new(TextureDefinition::from_bgra(
        16,
        8,
        vec![255; 16 * 8 * 4],
        BorderWidths {
            top: 1,
            right: 2,
            bottom: 3,
            left: 4,
        },
        false,
    ));
    let expected = [
        [0.0, 0.0],
        [0.25, 0.0],
        [0.25, 0.125],
        [0.0, 0.125],
        [0.875, 0.0],
        [1.0, 0.0],
        [1.0, 0.125],
        [0.875, 0.125],
        [0.0, 0.625],
        [0.25, 0.625],
        [0.25, 1.0],
        [0.0, 1.0],
        [0.875, 0.625],
        [1.0, 0.625],
        [1.0, 1.0],
        [0.875, 1.0],
    ];
    assert_eq!(border_tex_coords(&def), expected);

    let mut gpu = RecordingGpu::new();
    let mut quad = StyleQuad::new(&mut gpu).unwrap();
    quad.set_border_image(&mut gpu, Some(def)).unwrap();
    quad.update_geometry(&mut gpu, &Rectangle::new(0.0, 0.0, 40.0, 20.0))
        .unwrap();
    quad.draw(&mut gpu);

    let draws = gpu.draws();
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].texture_size, (16.0, 8.0));
    let coords = draws[0].tex_coord_buffer.unwrap();
    assert_eq!(gpu.written_points(coords).unwrap(), expected.to_vec());
}

#[test]
fn style_pass_retries_a_failed_load() {
    let mut gpu = RecordingGpu::new();
    let mut quad = StyleQuad::new(&mut gpu).unwrap();
    let def = texture(8, 8, 2, false);

    let mut style = Style::new("frame");
    style.set(DrawState::Normal, "border-image", PropertyValue::Texture(def.clone()));
    let owner = Owner::new(style);

    gpu.fail_next_upload();
    assert!(quad.update_style(&mut gpu, &owner).is_err());
    assert!(quad.border_image().is_none());

    quad.update_style(&mut gpu, &owner).unwrap();
    assert!(Rc::ptr_eq(quad.border_image().unwrap(), &def));
}

#[test]
fn oversized_texture_is_rejected() {
    let mut gpu = RecordingGpu::with_max_texture_size(16);
    let mut quad = StyleQuad::new(&mut gpu).unwrap();

    let err = quad.set_border_image(&mut gpu, Some(texture(32, 8, 2, false)));
    assert!(matches!(err, Err(GpuError::TextureTooLarge { limit: 16, .. })));
    assert!(quad.border_image().is_none());
}

#[test]
fn drop_releases_every_gpu_object() {
    let mut gpu = RecordingGpu::new();
    {
        let mut quad = StyleQuad::new(&mut gpu).unwrap();
        quad.set_border_image(&mut gpu, Some(texture(8, 8, 2, false)))
            .unwrap();
        let stats = gpu.stats();
        assert_eq!(stats.buffers_created, 3);
        assert_eq!(stats.textures_created, 2);
    }
    let stats = gpu.stats();
    assert_eq!(stats.live_buffers(), 0);
    assert_eq!(stats.live_textures(), 0);
    assert_eq!(stats.buffers_released, 3);
}

#[test]
fn failed_construction_leaks_nothing() {
    let mut gpu = RecordingGpu::new();
    gpu.fail_next_allocation();
    assert!(StyleQuad::new(&mut gpu).is_err());
    assert_eq!(gpu.stats().live_buffers(), 0);
    assert_eq!(gpu.stats().live_textures(), 0);
}
