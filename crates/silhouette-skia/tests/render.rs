use std::rc::Rc;
use std::time::Duration;

use kurbo::Rect;
use silhouette_core::{
    Direction, MonospaceMeasurer, Node, Overlay, OverlayConfig, SilhouettePath, SilhouetteTracer,
    TextMeasurer, Visibility,
};
use silhouette_skia::{intersect, union, OverlayRenderer, SkiaTextMeasurer};
use skia_safe::ImageInfo;

struct Pixels {
    width: usize,
    data: Vec<u8>,
}

impl Pixels {
    fn at(&self, x: usize, y: usize) -> [u8; 4] {
        let idx = (y * self.width + x) * 4;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }
}

fn render(overlay: &Overlay, width: i32, height: i32) -> Pixels {
    let mut surface = skia_safe::surfaces::raster_n32_premul((width, height)).unwrap();
    surface.canvas().clear(skia_safe::Color::TRANSPARENT);
    OverlayRenderer::draw(surface.canvas(), overlay);

    let mut data = vec![0u8; (width * height * 4) as usize];
    let info = ImageInfo::new_n32_premul((width, height), None);
    assert!(surface.read_pixels(&info, &mut data, (width * 4) as usize, (0, 0)));
    Pixels {
        width: width as usize,
        data,
    }
}

fn overlay_for(root: &Node) -> Rc<Overlay> {
    let tracer = SilhouetteTracer::new(Rc::new(MonospaceMeasurer::default()));
    let overlay = Rc::new(Overlay::new(&OverlayConfig::default()));
    overlay.trace(&tracer, root);
    overlay
}

#[test]
fn fills_silhouette_with_darker_gray() {
    let overlay = overlay_for(&Node::generic(Rect::new(0.0, 0.0, 100.0, 40.0)));
    let pixels = render(&overlay, 100, 40);

    assert_eq!(pixels.at(50, 20), [170, 170, 170, 255]);
    // inset edge stays clear
    assert_eq!(pixels.at(0, 0)[3], 0);
    assert_eq!(pixels.at(99, 39)[3], 0);
}

#[test]
fn reserved_bounds_do_not_paint() {
    let root = Node::container(
        Rect::new(0.0, 0.0, 100.0, 40.0),
        vec![
            Node::generic(Rect::new(0.0, 0.0, 100.0, 40.0)).with_visibility(Visibility::Hidden),
            Node::generic(Rect::new(0.0, 0.0, 20.0, 20.0)),
        ],
    );
    let overlay = overlay_for(&root);
    let pixels = render(&overlay, 100, 40);

    assert_eq!(pixels.at(10, 10)[3], 255);
    assert_eq!(pixels.at(60, 30)[3], 0);
}

#[test]
fn shimmer_is_masked_to_the_silhouette() {
    let overlay = overlay_for(&Node::generic(Rect::new(0.0, 0.0, 200.0, 40.0)));
    let sync = overlay.start_shimmer(Duration::from_millis(1000), None);
    sync.tick(0.0);
    assert_eq!(overlay.shimmer_progress(), 0);

    let pixels = render(&overlay, 200, 40);
    // inside the band (x < 66) the highlight brightens the fill
    assert!(pixels.at(30, 20)[0] > 170, "{:?}", pixels.at(30, 20));
    // outside the band the fill is untouched
    assert_eq!(pixels.at(120, 20), [170, 170, 170, 255]);
    // inside the band but off the silhouette nothing is drawn
    assert_eq!(pixels.at(30, 1)[3], 0);
}

#[test]
fn transparent_overlay_draws_nothing() {
    let overlay = overlay_for(&Node::generic(Rect::new(0.0, 0.0, 50.0, 50.0)));
    overlay.set_alpha(0.0);
    let pixels = render(&overlay, 50, 50);
    assert_eq!(pixels.at(25, 25), [0, 0, 0, 0]);
}

#[test]
fn boolean_ops_follow_skia() {
    let mut a = SilhouettePath::new();
    a.add_rect(Rect::new(0.0, 0.0, 60.0, 40.0), Direction::Clockwise);
    let mut b = SilhouettePath::new();
    b.add_rect(Rect::new(40.0, 20.0, 100.0, 80.0), Direction::Clockwise);

    let overlap = intersect(&a, &b).unwrap();
    assert_eq!(*overlap.bounds(), skia_safe::Rect::new(40.0, 20.0, 60.0, 40.0));

    let combined = union(&a, &b).unwrap();
    assert_eq!(*combined.bounds(), skia_safe::Rect::new(0.0, 0.0, 100.0, 80.0));
}

#[test]
fn writes_png() {
    let overlay = overlay_for(&Node::generic(Rect::new(0.0, 0.0, 64.0, 32.0)));
    let png = OverlayRenderer::render_png(&overlay, (64, 32), None).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("overlay.png");
    std::fs::write(&path, &png).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn skia_measurer_orders_by_width() {
    let measurer = SkiaTextMeasurer::new();
    assert_eq!(measurer.measure("", "Arial", 14.0), 0.0);

    let narrow = measurer.measure("iii", "Arial", 14.0);
    let wide = measurer.measure("WWWWWWWW", "Arial", 14.0);
    assert!(narrow <= wide);
    assert!(wide >= 0.0);
}
