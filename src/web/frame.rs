use crate::frame::FrameSchedule;
use crate::plot::BiosignalPlot;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

type Tick = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// requestAnimationFrame loop redrawing one plot.
///
/// The frame callback is built once and reused across stop/start cycles.
pub struct RenderLoop {
    schedule: Rc<FrameSchedule>,
    tick: Tick,
}

impl RenderLoop {
    pub fn new(plot: Rc<RefCell<Box<dyn BiosignalPlot>>>) -> Self {
        let schedule = Rc::new(FrameSchedule::new());
        let tick: Tick = Rc::new(RefCell::new(None));
        let tick_clone = tick.clone();
        let schedule_tick = schedule.clone();
        *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            if !schedule_tick.tick() {
                return;
            }
            if let Ok(mut plot) = plot.try_borrow_mut() {
                plot.update();
            }
            request_frame(&tick_clone);
        }) as Box<dyn FnMut()>));
        Self { schedule, tick }
    }

    pub fn start(&self) {
        if self.schedule.start() {
            request_frame(&self.tick);
        }
    }

    pub fn stop(&self) {
        self.schedule.stop();
    }
}

fn request_frame(tick: &Tick) {
    let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref().map(|c| c.as_ref().clone())) else {
        return;
    };
    _ = w.request_animation_frame(cb.unchecked_ref());
}
