//! Firefly entry point
//!
//! On the web this binds the app to the `background` canvas and drives it
//! with `setTimeout`. Natively it runs a short headless session against the
//! recording backend.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent};

    use firefly::persistence::LocalStorage;
    use firefly::platform::viewport;
    use firefly::renderer::{CanvasBackend, ImageLoader, Surface};
    use firefly::sim::Dimensions;
    use firefly::{App, Context};

    fn now_seconds() -> f64 {
        js_sys::Date::now() / 1000.0
    }

    fn window_bounds(window: &web_sys::Window) -> Dimensions {
        viewport(
            window.inner_width().ok().and_then(|v| v.as_f64()),
            window.inner_height().ok().and_then(|v| v.as_f64()),
        )
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("background")
            .expect("no background canvas")
            .dyn_into()
            .expect("not a canvas");

        let backend = CanvasBackend::new(canvas).expect("no 2d context");
        let surface = Surface::new(Box::new(backend), window_bounds(&window));

        let seed = js_sys::Date::now() as u64;
        let ctx = Context::new(Box::new(LocalStorage), Rc::new(ImageLoader), seed);
        let app = Rc::new(RefCell::new(App::new(ctx, surface)));
        log::info!("Firefly initialized with seed: {}", seed);

        setup_listeners(&window, app.clone());

        if let Err(e) = app.borrow_mut().start() {
            log::error!("Could not start: {}", e);
            return;
        }
        schedule(app, 0.0);
    }

    /// Run one tick after `delay` seconds, then reschedule
    fn schedule(app: Rc<RefCell<App>>, delay: f64) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move || {
            let next = app.borrow_mut().tick(now_seconds());
            sync_page(&app.borrow());
            if let Some(next) = next {
                schedule(app, next);
            }
        });
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            (delay * 1000.0) as i32,
        );
        closure.forget();
    }

    /// Hide the page content while the minigame is up
    fn sync_page(app: &App) {
        let Some(main) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("main"))
        else {
            return;
        };
        let hidden = main.has_attribute("hidden");
        if app.minigame_active() && !hidden {
            let _ = main.set_attribute("hidden", "");
        } else if !app.minigame_active() && hidden {
            let _ = main.remove_attribute("hidden");
        }
    }

    fn setup_listeners(window: &web_sys::Window, app: Rc<RefCell<App>>) {
        // Resize
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if let Some(window) = web_sys::window() {
                    app.borrow_mut().resize(window_bounds(&window));
                }
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                app.borrow_mut().key_down(event.key_code());
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                app.borrow_mut().key_up(event.key_code());
            });
            let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keys released outside the window never report keyup
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().release_keys();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    web::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use firefly::platform::CHEAT_CODE;
    use firefly::renderer::{RecordingBackend, Surface};
    use firefly::sim::Dimensions;
    use firefly::{App, Context};

    env_logger::init();
    log::info!("Firefly (native) starting a headless session...");

    let (backend, recording) = RecordingBackend::new();
    let surface = Surface::new(Box::new(backend), Dimensions::new(1280.0, 720.0));
    let mut app = App::new(Context::headless(0x5eed), surface);
    if let Err(e) = app.start() {
        log::error!("Could not start: {}", e);
        return;
    }

    // Simulated clock: follow the runner's schedule for 15 seconds, typing
    // the cheat code after 2
    let mut now = 0.0;
    let mut typed = false;
    while now < 15.0 {
        let Some(next) = app.tick(now) else {
            break;
        };
        if !typed && now >= 2.0 {
            for code in CHEAT_CODE {
                app.key_down(code);
                app.key_up(code);
            }
            typed = true;
        }
        now += next.max(app.runner().interval());
    }

    log::info!(
        "Finished on {:?} after {} recorded draw calls",
        app.runner().scene_id(),
        recording.ops().len()
    );
}
