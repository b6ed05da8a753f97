//! SForm WASM
//!
//! Browser bindings for SForm. `start` binds every `SForm` form on the page,
//! attaches one listener per target and event, and validates fields as the
//! user types.
//!
//! # Example (JavaScript)
//! ```javascript
//! import init, { startOnLoad } from './sform_wasm.js';
//!
//! await init();
//! startOnLoad({ events: { default_trigger: 'input' } }, {
//!     isEven: (value) => Number(value) % 2 === 0,
//! });
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Function, Object, Reflect};
use sform::{Config, Dispatch, Dom, FormRegistry, Predicate, PredicateRegistry};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event};

mod web_dom;

pub use web_dom::WebDom;

/// Set panic hook for better error messages in the browser
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

struct Runtime {
    dom: WebDom,
    registry: FormRegistry<Element>,
}

type Handler = Closure<dyn FnMut(Event)>;

/// Live state between `start` and `teardown`
struct Session {
    runtime: Rc<RefCell<Runtime>>,
    handlers: Vec<(Element, String, Handler)>,
}

impl Session {
    fn detach(self) {
        for (target, event, handler) in self.handlers {
            if let Err(err) = target.remove_event_listener_with_callback(&event, handler.as_ref().unchecked_ref()) {
                web_sys::console::warn_1(&err);
            }
        }
    }
}

thread_local! {
    static SESSION: RefCell<Option<Session>> = RefCell::new(None);
}

fn document() -> Result<web_sys::Document, JsValue> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document available"))
}

fn parse_config(options: JsValue) -> Result<Config, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok(Config::default());
    }
    serde_wasm_bindgen::from_value(options)
        .map_err(|e| JsValue::from_str(&format!("Failed to parse options: {}", e)))
}

/// Turns `{ name: function(value) { ... } }` into a predicate registry
fn parse_predicates(predicates: JsValue) -> Result<PredicateRegistry, JsValue> {
    let mut registry = PredicateRegistry::new();
    if predicates.is_undefined() || predicates.is_null() {
        return Ok(registry);
    }

    let object: Object = predicates
        .dyn_into()
        .map_err(|_| JsValue::from_str("predicates must be an object"))?;

    for key in Object::keys(&object).iter() {
        let name = key.as_string().unwrap_or_default();
        let function: Function = Reflect::get(&object, &key)?
            .dyn_into()
            .map_err(|_| JsValue::from_str(&format!("predicate `{}` is not a function", name)))?;

        registry.insert(
            name,
            Predicate::new(move |value| match function.call1(&JsValue::NULL, &JsValue::from_str(value)) {
                Ok(result) => result.is_truthy(),
                Err(err) => {
                    // a throwing predicate counts as a failed check
                    web_sys::console::error_1(&err);
                    false
                }
            }),
        );
    }

    Ok(registry)
}

fn listen(runtime: &Rc<RefCell<Runtime>>, target: &Element, event: &str) -> Result<Handler, JsValue> {
    let runtime = Rc::clone(runtime);
    let node = target.clone();
    let name = event.to_string();

    let handler = Closure::wrap(Box::new(move |ev: Event| {
        let Ok(mut runtime) = runtime.try_borrow_mut() else {
            return;
        };
        let Runtime { dom, registry } = &mut *runtime;
        if registry.dispatch(dom, &node, &name) == Dispatch::Cancel {
            ev.prevent_default();
        }
    }) as Box<dyn FnMut(Event)>);

    target.add_event_listener_with_callback(event, handler.as_ref().unchecked_ref())?;
    Ok(handler)
}

fn with_runtime<T>(f: impl FnOnce(&mut Runtime) -> Result<T, JsValue>) -> Result<T, JsValue> {
    SESSION.with(|session| {
        let session = session.borrow();
        let session = session
            .as_ref()
            .ok_or_else(|| JsValue::from_str("sform is not started"))?;
        let mut runtime = session
            .runtime
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("sform is busy"))?;
        f(&mut runtime)
    })
}

/// Bind every form on the page now
///
/// # Arguments
/// * `options` - optional configuration object (same shape as `sform.toml`)
/// * `predicates` - optional object mapping `data-custom` names to functions
///
/// # Returns
/// Number of forms bound. Forms with markup errors are reported on the
/// console and their submit is always cancelled. A previous session is torn
/// down first.
#[wasm_bindgen]
pub fn start(options: JsValue, predicates: JsValue) -> Result<usize, JsValue> {
    let config = parse_config(options)?;
    let predicates = parse_predicates(predicates)?;
    teardown();

    let mut dom = WebDom::new(document()?, config.hints.display.clone());
    let registry = FormRegistry::bootstrap(&mut dom, config, predicates);
    for err in registry.errors() {
        web_sys::console::error_1(&JsValue::from_str(&format!("sform: {}", err)));
    }

    let bound = registry.forms().len();
    let points = registry.listen_points();
    let mut session = Session {
        runtime: Rc::new(RefCell::new(Runtime { dom, registry })),
        handlers: Vec::with_capacity(points.len()),
    };

    for (target, event) in points {
        match listen(&session.runtime, &target, &event) {
            Ok(handler) => session.handlers.push((target, event, handler)),
            Err(err) => {
                session.detach();
                return Err(err);
            }
        }
    }

    SESSION.with(|slot| *slot.borrow_mut() = Some(session));
    Ok(bound)
}

/// Run `start` once the page has loaded
#[wasm_bindgen(js_name = startOnLoad)]
pub fn start_on_load(options: JsValue, predicates: JsValue) -> Result<(), JsValue> {
    if document()?.ready_state() == "complete" {
        return start(options, predicates).map(|_| ());
    }

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window available"))?;
    let on_load = Closure::once_into_js(move || {
        if let Err(err) = start(options, predicates) {
            web_sys::console::error_1(&err);
        }
    });
    window.add_event_listener_with_callback("load", on_load.unchecked_ref())
}

/// Re-validate one field by id and update its hints
#[wasm_bindgen]
pub fn validate(field_id: &str) -> Result<bool, JsValue> {
    with_runtime(|runtime| {
        let Runtime { dom, registry } = runtime;
        let field = dom
            .element_by_id(field_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element #{}", field_id)))?;
        registry
            .validate_field(dom, &field)
            .map(|outcome| outcome.valid)
            .ok_or_else(|| JsValue::from_str(&format!("#{} is not a bound field", field_id)))
    })
}

/// Whether every field of the form has been validated and passed
#[wasm_bindgen(js_name = isValid)]
pub fn is_valid(form_id: &str) -> Result<bool, JsValue> {
    with_runtime(|runtime| {
        let form = runtime
            .dom
            .element_by_id(form_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element #{}", form_id)))?;
        runtime
            .registry
            .is_form_valid(&form)
            .ok_or_else(|| JsValue::from_str(&format!("#{} is not a bound form", form_id)))
    })
}

/// Remove every listener attached by `start`
#[wasm_bindgen]
pub fn teardown() {
    if let Some(session) = SESSION.with(|slot| slot.borrow_mut().take()) {
        session.detach();
    }
}
