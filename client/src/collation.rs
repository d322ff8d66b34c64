use std::cmp::Ordering;

/// Compare two names the way the visited list is ordered.
///
/// In the browser this is `Intl.Collator("zh-Hant")`; elsewhere it falls back
/// to code-point order.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    imp::compare(a, b)
}

#[cfg(target_arch = "wasm32")]
mod imp {
    use std::cell::RefCell;
    use std::cmp::Ordering;

    use js_sys::{Array, Function, Intl, Object};
    use wasm_bindgen::JsValue;

    const LIST_LOCALE: &str = "zh-Hant";

    thread_local! {
        static COMPARE: RefCell<Option<Function>> = const { RefCell::new(None) };
    }

    pub(super) fn compare(a: &str, b: &str) -> Ordering {
        COMPARE.with(|slot| {
            let mut slot = slot.borrow_mut();
            let compare = slot.get_or_insert_with(|| {
                let locales = Array::of1(&JsValue::from_str(LIST_LOCALE));
                Intl::Collator::new(&locales, &Object::new()).compare()
            });
            compare
                .call2(&JsValue::NULL, &JsValue::from_str(a), &JsValue::from_str(b))
                .ok()
                .and_then(|result| result.as_f64())
                .map(|value| value.partial_cmp(&0.0).unwrap_or(Ordering::Equal))
                .unwrap_or_else(|| a.cmp(b))
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use std::cmp::Ordering;

    pub(super) fn compare(a: &str, b: &str) -> Ordering {
        a.cmp(b)
    }
}
