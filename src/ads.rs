//! Ad/monetization gateway capability.
//!
//! The host page may provide an ad SDK (`window.PokiSDK`). One gateway
//! variant is selected at startup: `Poki` forwards to the SDK with every call
//! wrapped so a missing or failing SDK can never interrupt game flow, and
//! `Noop` stands in when the SDK is absent - interstitials resolve
//! immediately, rewarded breaks resolve as not granted.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen_futures::JsFuture;

/// Result of a rewarded ad break
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardOutcome {
    pub granted: bool,
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(inline_js = "
    export function poki_available() {
        return typeof window.PokiSDK !== 'undefined';
    }
    export function poki_init() {
        try { return window.PokiSDK.init(); } catch (e) { return Promise.reject(e); }
    }
    export function poki_call(name) {
        try { window.PokiSDK[name](); } catch (e) {}
    }
    export function poki_commercial_break() {
        try { return window.PokiSDK.commercialBreak(); }
        catch (e) { return Promise.resolve(); }
    }
    export function poki_rewarded_break() {
        try { return window.PokiSDK.rewardedBreak(); }
        catch (e) { return Promise.resolve({ success: false }); }
    }
")]
extern "C" {
    fn poki_available() -> bool;
    fn poki_init() -> js_sys::Promise;
    fn poki_call(name: &str);
    fn poki_commercial_break() -> js_sys::Promise;
    fn poki_rewarded_break() -> js_sys::Promise;
}

/// The gateway the game talks to; chosen once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdGateway {
    #[cfg(target_arch = "wasm32")]
    Poki,
    Noop,
}

impl AdGateway {
    /// Detect and initialize the host SDK; falls back to `Noop` when the SDK
    /// is missing or its init fails.
    #[cfg(target_arch = "wasm32")]
    pub async fn init() -> Self {
        if !poki_available() {
            log::info!("Ad SDK not present; using no-op gateway");
            return AdGateway::Noop;
        }
        match JsFuture::from(poki_init()).await {
            Ok(_) => {
                log::info!("Ad SDK initialized");
                AdGateway::Poki
            }
            Err(e) => {
                log::warn!("Ad SDK init failed ({e:?}); using no-op gateway");
                AdGateway::Noop
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub async fn init() -> Self {
        AdGateway::Noop
    }

    pub fn loading_started(&self) {
        self.hook("gameLoadingStart");
    }

    pub fn loading_finished(&self) {
        self.hook("gameLoadingFinished");
    }

    pub fn gameplay_started(&self) {
        self.hook("gameplayStart");
    }

    pub fn gameplay_stopped(&self) {
        self.hook("gameplayStop");
    }

    #[cfg(target_arch = "wasm32")]
    fn hook(&self, name: &str) {
        if matches!(self, AdGateway::Poki) {
            poki_call(name);
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn hook(&self, _name: &str) {}

    /// Commercial break. Resolves when the break finishes (or immediately for
    /// the no-op gateway); a failing SDK is treated as a finished break.
    #[cfg(target_arch = "wasm32")]
    pub async fn request_interstitial(&self) {
        if matches!(self, AdGateway::Poki) {
            if let Err(e) = JsFuture::from(poki_commercial_break()).await {
                log::warn!("Commercial break failed: {e:?}");
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub async fn request_interstitial(&self) {}

    /// Rewarded break. Not granted when the SDK is absent or errors.
    #[cfg(target_arch = "wasm32")]
    pub async fn request_rewarded(&self) -> RewardOutcome {
        if !matches!(self, AdGateway::Poki) {
            return RewardOutcome { granted: false };
        }
        match JsFuture::from(poki_rewarded_break()).await {
            Ok(value) => {
                let granted = js_sys::Reflect::get(&value, &JsValue::from_str("success"))
                    .ok()
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false);
                RewardOutcome { granted }
            }
            Err(e) => {
                log::warn!("Rewarded break failed: {e:?}");
                RewardOutcome { granted: false }
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub async fn request_rewarded(&self) -> RewardOutcome {
        RewardOutcome { granted: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::pin;
    use std::task::{Context, Poll, Waker};

    /// The no-op gateway must resolve without ever yielding
    fn resolve_now<F: Future>(fut: F) -> F::Output {
        let mut fut = pin!(fut);
        let mut cx = Context::from_waker(Waker::noop());
        match fut.as_mut().poll(&mut cx) {
            Poll::Ready(out) => out,
            Poll::Pending => panic!("no-op gateway future was not immediately ready"),
        }
    }

    #[test]
    fn test_noop_interstitial_resolves_immediately() {
        let gateway = AdGateway::Noop;
        resolve_now(gateway.request_interstitial());
    }

    #[test]
    fn test_noop_rewarded_not_granted() {
        let gateway = AdGateway::Noop;
        let outcome = resolve_now(gateway.request_rewarded());
        assert!(!outcome.granted);
    }

    #[test]
    fn test_noop_hooks_are_safe() {
        let gateway = AdGateway::Noop;
        gateway.loading_started();
        gateway.loading_finished();
        gateway.gameplay_started();
        gateway.gameplay_stopped();
    }
}
