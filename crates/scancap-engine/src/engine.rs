//! The negotiation session.
//!
//! A [`NegotiationEngine`] owns the transport and the per-device state:
//! registry, value cache and error history. It is the only way callers
//! read or write capability values. Every attempt, successful or not, is
//! recorded in the history.
//!
//! The engine is single-threaded. Wrap it in a lock if more than one
//! thread negotiates with the same device.

use scancap_core::names::{CAP_SUPPORTEDCAPS, id_from_name};
use scancap_core::{CapabilityId, ContainerType, RangeDomain, Value, ValueRange};
use scancap_protocol::{
    ContainerVariant, GetMessage, GetOperation, NegotiationResult, OperationDescriptor,
    ProtocolResult, SetMessage, SetOperation,
};
use scancap_transport::{CapabilityTransport, DeviceIdentity};
use tracing::{debug, warn};

use crate::cache::ValueCache;
use crate::config::EngineConfig;
use crate::error::{NegotiationError, NegotiationResultOf};
use crate::history::ErrorHistory;
use crate::registry::CapabilityRegistry;

/// Negotiates capability values with one attached device at a time.
#[derive(Debug)]
pub struct NegotiationEngine<T> {
    transport: T,
    registry: CapabilityRegistry,
    cache: ValueCache,
    history: ErrorHistory,
}

impl<T: CapabilityTransport> NegotiationEngine<T> {
    /// Creates an engine with the default configuration.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, &EngineConfig::default())
    }

    pub fn with_config(transport: T, config: &EngineConfig) -> Self {
        Self {
            transport,
            registry: CapabilityRegistry::new(),
            cache: ValueCache::from_config(config),
            history: ErrorHistory::new(config.history_capacity),
        }
    }

    /// Attaches `device`, replacing all state from any previous device.
    ///
    /// Returns false if the device reported no capabilities; the device is
    /// still attached and every capability id is passed through.
    pub fn attach(&mut self, device: DeviceIdentity) -> bool {
        self.cache.clear();
        self.history.clear();
        self.registry.attach(&mut self.transport, device)
    }

    /// Detaches the current device and clears all state. Idempotent.
    pub fn detach(&mut self) {
        self.registry.detach();
        self.cache.clear();
        self.history.clear();
    }

    pub fn is_attached(&self) -> bool {
        self.registry.is_attached()
    }

    pub fn device(&self) -> Option<&DeviceIdentity> {
        self.registry.device()
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &ValueCache {
        &self.cache
    }

    /// Drops the cached GET answer for `id`, e.g. after a set. Returns
    /// true if an entry was removed.
    pub fn invalidate_cached(&mut self, id: CapabilityId) -> bool {
        self.cache.invalidate(id)
    }

    pub fn history(&self) -> &ErrorHistory {
        &self.history
    }

    pub fn set_history_capacity(&mut self, capacity: usize) {
        self.history.set_capacity(capacity);
    }

    /// The newest history record.
    pub fn last_result(&self) -> Option<NegotiationResult> {
        self.history.most_recent()
    }

    /// Exports the history, newest first, as JSON.
    pub fn history_json(&self) -> ProtocolResult<String> {
        self.history.to_json()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Returns the engine's transport, dropping all device state.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// True if `id` would pass the capability precondition.
    pub fn is_capability_supported(&self, id: CapabilityId) -> bool {
        self.registry.is_attached() && self.registry.is_supported(id)
    }

    /// Reads the values of a capability.
    ///
    /// Plain GET requests for cache-eligible capabilities are served from
    /// the cache when possible. With [`GetOperation::with_expand_range`],
    /// range-shaped answers are returned as the explicit list of values.
    pub fn get_values(
        &mut self,
        id: CapabilityId,
        op: GetOperation,
    ) -> NegotiationResultOf<Vec<Value>> {
        let outcome = self.fetch(id, op);
        self.record(id, op, outcome.as_ref().err());
        outcome
    }

    /// GETCURRENT shortcut.
    pub fn get_current(&mut self, id: CapabilityId) -> NegotiationResultOf<Vec<Value>> {
        self.get_values(id, GetOperation::current())
    }

    /// GETDEFAULT shortcut.
    pub fn get_default(&mut self, id: CapabilityId) -> NegotiationResultOf<Vec<Value>> {
        self.get_values(id, GetOperation::default_value())
    }

    /// Reads a capability by symbolic name.
    ///
    /// Standard names come from the name table; vendor capabilities are
    /// matched against the names the device reported at attach. A name that
    /// resolves to nothing fails with [`NegotiationError::UnknownName`]
    /// before any negotiation starts, so it leaves no history record.
    pub fn get_values_by_name(
        &mut self,
        name: &str,
        op: GetOperation,
    ) -> NegotiationResultOf<Vec<Value>> {
        let id = id_from_name(name)
            .or_else(|| self.registry.find_by_name(name))
            .ok_or_else(|| NegotiationError::UnknownName(name.to_string()))?;
        self.get_values(id, op)
    }

    /// Writes the values of a capability.
    ///
    /// An empty `values` list always sends RESET, whatever message `op`
    /// carries. The cache is not touched.
    pub fn set_values(
        &mut self,
        values: &[Value],
        id: CapabilityId,
        op: SetOperation,
    ) -> NegotiationResult {
        let effective = if values.is_empty() && op.message() != SetMessage::Reset {
            debug!(cap = %id, requested = %op.message(), "no values given, sending reset");
            op.with_message(SetMessage::Reset)
        } else {
            op
        };

        let outcome = self
            .check_preconditions(id)
            .and_then(|()| self.send(id, effective.message(), values));
        self.record(id, effective, outcome.as_ref().err())
    }

    /// Resets a capability to its power-on default.
    pub fn reset(&mut self, id: CapabilityId) -> NegotiationResult {
        self.set_values(&[], id, SetOperation::reset())
    }

    /// Resets every capability of the device to its power-on default.
    ///
    /// Sent through CAP_SUPPORTEDCAPS, and not subject to the registry's
    /// capability check.
    pub fn reset_all(&mut self) -> NegotiationResult {
        let id = CAP_SUPPORTEDCAPS;
        let op = SetOperation::reset_all();
        let outcome = if self.registry.is_attached() {
            self.send(id, op.message(), &[])
        } else {
            Err(NegotiationError::BadSource)
        };
        self.record(id, op, outcome.as_ref().err())
    }

    /// Tests whether the device accepts `value` for a capability.
    ///
    /// Candidates come from the cache or, on a miss, from exactly one GET.
    /// Range-shaped capabilities are tested by step arithmetic, others by
    /// exact equality. The outcome is recorded as a support-test record.
    pub fn is_value_supported(&mut self, value: &Value, id: CapabilityId) -> bool {
        let supported = match self.check_preconditions(id) {
            Ok(()) => self.test_support(value, id),
            Err(err) => {
                debug!(cap = %id, error = %err, "support test precondition failed");
                false
            }
        };
        self.history.record(NegotiationResult::support_test(
            id,
            GetOperation::get(),
            supported,
        ));
        supported
    }

    fn check_preconditions(&self, id: CapabilityId) -> NegotiationResultOf<()> {
        if !self.registry.is_attached() {
            return Err(NegotiationError::BadSource);
        }
        if !self.registry.is_supported(id) {
            return Err(NegotiationError::CapNotSupported(id));
        }
        Ok(())
    }

    fn fetch(&mut self, id: CapabilityId, op: GetOperation) -> NegotiationResultOf<Vec<Value>> {
        self.check_preconditions(id)?;

        let cached = if op.message() == GetMessage::Get && self.cache.is_cache_eligible(id) {
            self.cache.get(id)
        } else {
            None
        };

        let values = match cached {
            Some(values) => {
                debug!(cap = %id, "served from cache");
                values
            }
            None => {
                let device = self.registry.device().ok_or(NegotiationError::BadSource)?;
                let raw = self.transport.query_values(
                    device,
                    id,
                    op.message(),
                    op.container_type(),
                    op.data_type(),
                )?;
                // Any container-bearing get variant fills the single slot;
                // only plain GET reads it back. GETHELP and GETLABELENUM
                // answers are not value lists and are never cached.
                if op.message().container_variant().is_some() && self.registry.contains(id) {
                    self.cache.put(id, &raw);
                }
                raw
            }
        };

        if op.expand_range() {
            self.expand_if_range(id, op, values)
        } else {
            Ok(values)
        }
    }

    fn expand_if_range(
        &mut self,
        id: CapabilityId,
        op: GetOperation,
        values: Vec<Value>,
    ) -> NegotiationResultOf<Vec<Value>> {
        let Some(variant) = op.message().container_variant() else {
            return Ok(values);
        };
        let container = self
            .registry
            .container_type(&mut self.transport, id, variant);
        if container != ContainerType::Range {
            return Ok(values);
        }

        let domain = self.range_domain(id, op, &values)?;
        let expanded = ValueRange::decode(&values, domain)?.expand();
        debug!(cap = %id, count = expanded.len(), "expanded range");
        Ok(expanded)
    }

    /// Domain of a range answer: the registry's data type, else the
    /// operation's hint, else whatever the values look like.
    fn range_domain(
        &self,
        id: CapabilityId,
        op: GetOperation,
        values: &[Value],
    ) -> NegotiationResultOf<RangeDomain> {
        let data_type = self
            .registry
            .descriptor(id)
            .map(|d| d.data_type)
            .or(op.data_type());
        match data_type {
            Some(data_type) => Ok(RangeDomain::for_data_type(data_type)?),
            None => Ok(RangeDomain::infer(values)),
        }
    }

    fn send(
        &mut self,
        id: CapabilityId,
        message: SetMessage,
        values: &[Value],
    ) -> NegotiationResultOf<()> {
        let device = self.registry.device().ok_or(NegotiationError::BadSource)?;
        self.transport.set_values(device, id, message, values)?;
        Ok(())
    }

    fn test_support(&mut self, value: &Value, id: CapabilityId) -> bool {
        let candidates = match self.cache.get(id) {
            Some(values) => values,
            None => match self.get_values(id, GetOperation::get()) {
                Ok(values) => values,
                Err(err) => {
                    debug!(cap = %id, error = %err, "no candidates for support test");
                    return false;
                }
            },
        };

        match self
            .registry
            .container_type(&mut self.transport, id, ContainerVariant::Get)
        {
            ContainerType::Range => {
                let decoded = self
                    .range_domain(id, GetOperation::get(), &candidates)
                    .and_then(|domain| {
                        ValueRange::decode(&candidates, domain).map_err(NegotiationError::from)
                    });
                match decoded {
                    Ok(range) => range.contains(value),
                    Err(err) => {
                        debug!(cap = %id, error = %err, "cannot test against malformed range");
                        false
                    }
                }
            }
            _ => candidates.contains(value),
        }
    }

    fn record(
        &mut self,
        id: CapabilityId,
        op: impl Into<OperationDescriptor>,
        error: Option<&NegotiationError>,
    ) -> NegotiationResult {
        let result = match error {
            None => NegotiationResult::succeeded(id, op),
            Some(err) => {
                match err {
                    NegotiationError::Transport(_) => {
                        warn!(cap = %id, error = %err, "negotiation failed")
                    }
                    _ => debug!(cap = %id, error = %err, "negotiation rejected"),
                }
                NegotiationResult::failed(id, op, err.code())
            }
        };
        self.history.record(result.clone());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scancap_core::DataType;
    use scancap_core::names::{
        CAP_DUPLEXENABLED, CAP_FEEDERENABLED, ICAP_BRIGHTNESS, ICAP_CONTRAST, ICAP_PIXELTYPE,
        ICAP_SUPPORTEDSIZES, ICAP_UNITS, ICAP_XRESOLUTION,
    };
    use scancap_protocol::{ResultKind, codes};
    use scancap_transport::{
        ConditionCode, DeviceScript, ScriptedCapability, ScriptedTransport, TransportCall,
    };

    fn ints(items: &[i64]) -> Vec<Value> {
        items.iter().copied().map(Value::Integer).collect()
    }

    fn floats(items: &[f64]) -> Vec<Value> {
        items.iter().copied().map(Value::Float).collect()
    }

    fn flatbed() -> DeviceScript {
        DeviceScript::new("Flatbed")
            .with_capability(
                ScriptedCapability::new(ICAP_PIXELTYPE, DataType::UInt16)
                    .with_answer(GetMessage::Get, ContainerType::Enumeration, ints(&[0, 1, 2]))
                    .with_answer(GetMessage::GetCurrent, ContainerType::OneValue, ints(&[2]))
                    .with_answer(GetMessage::GetDefault, ContainerType::OneValue, ints(&[0])),
            )
            .with_capability(
                ScriptedCapability::new(ICAP_XRESOLUTION, DataType::Fix32)
                    .with_answer(GetMessage::Get, ContainerType::Enumeration, floats(&[
                        100.0, 200.0, 300.0,
                    ]))
                    .with_answer(GetMessage::GetCurrent, ContainerType::OneValue, floats(&[
                        200.0,
                    ])),
            )
            .with_capability(
                ScriptedCapability::new(ICAP_BRIGHTNESS, DataType::Fix32)
                    .with_answer(GetMessage::Get, ContainerType::Range, floats(&[
                        0.0, 1.0, 0.1, 0.5, 0.5,
                    ])),
            )
            .with_capability(
                ScriptedCapability::new(ICAP_CONTRAST, DataType::Int16)
                    .with_answer(GetMessage::Get, ContainerType::Range, ints(&[0, 10, 2, 4, 6])),
            )
            .with_capability(
                ScriptedCapability::new(ICAP_UNITS, DataType::UInt16)
                    .with_answer(GetMessage::Get, ContainerType::Range, ints(&[0, 10, 2, 4])),
            )
            .with_capability(
                ScriptedCapability::new(CAP_DUPLEXENABLED, DataType::Bool)
                    .with_failure(ConditionCode::CAP_BAD_OPERATION),
            )
            .with_capability(
                ScriptedCapability::new(CAP_FEEDERENABLED, DataType::Bool)
                    .with_answer(GetMessage::Get, ContainerType::OneValue, [Value::Boolean(
                        true,
                    )]),
            )
    }

    fn document_feeder() -> DeviceScript {
        DeviceScript::new("Feeder").with_capability(
            ScriptedCapability::new(ICAP_SUPPORTEDSIZES, DataType::UInt16).with_answer(
                GetMessage::Get,
                ContainerType::Enumeration,
                ints(&[1, 2, 3]),
            ),
        )
    }

    fn engine() -> NegotiationEngine<ScriptedTransport> {
        let transport = ScriptedTransport::new()
            .with_device(flatbed())
            .with_device(document_feeder());
        let mut engine = NegotiationEngine::new(transport);
        assert!(engine.attach(DeviceIdentity::new(1, "Flatbed")));
        engine.transport_mut().clear_calls();
        engine
    }

    #[test]
    fn cached_get_hits_the_device_once() {
        let mut engine = engine();

        let first = engine.get_values(ICAP_PIXELTYPE, GetOperation::get()).unwrap();
        let second = engine.get_values(ICAP_PIXELTYPE, GetOperation::get()).unwrap();

        assert_eq!(first, ints(&[0, 1, 2]));
        assert_eq!(first, second);
        assert_eq!(engine.transport().value_queries(ICAP_PIXELTYPE), 1);
        assert_eq!(engine.history().len(), 2);
        assert!(engine.history().iter().all(|r| r.success));
    }

    #[test]
    fn excluded_capability_always_goes_live() {
        let mut engine = engine();

        for _ in 0..3 {
            let values = engine
                .get_values(ICAP_XRESOLUTION, GetOperation::get())
                .unwrap();
            assert_eq!(values.len(), 3);
        }
        assert_eq!(engine.transport().value_queries(ICAP_XRESOLUTION), 3);
        assert!(!engine.cache().contains(ICAP_XRESOLUTION));
    }

    #[test]
    fn disabled_cache_always_goes_live() {
        let transport = ScriptedTransport::new().with_device(flatbed());
        let config = EngineConfig::default().with_cache_enabled(false);
        let mut engine = NegotiationEngine::with_config(transport, &config);
        engine.attach(DeviceIdentity::new(1, "Flatbed"));

        engine.get_values(ICAP_PIXELTYPE, GetOperation::get()).unwrap();
        engine.get_values(ICAP_PIXELTYPE, GetOperation::get()).unwrap();
        assert_eq!(engine.transport().value_queries(ICAP_PIXELTYPE), 2);
    }

    #[test]
    fn cached_values_are_copies() {
        let mut engine = engine();
        let mut first = engine.get_values(ICAP_PIXELTYPE, GetOperation::get()).unwrap();
        first.clear();

        let second = engine.get_values(ICAP_PIXELTYPE, GetOperation::get()).unwrap();
        assert_eq!(second, ints(&[0, 1, 2]));
    }

    #[test]
    fn current_value_fills_the_get_slot() {
        let mut engine = engine();

        assert_eq!(engine.get_current(ICAP_PIXELTYPE).unwrap(), ints(&[2]));
        // the GETCURRENT answer now satisfies a plain GET
        assert_eq!(
            engine.get_values(ICAP_PIXELTYPE, GetOperation::get()).unwrap(),
            ints(&[2])
        );
        assert_eq!(engine.transport().value_queries(ICAP_PIXELTYPE), 1);

        // non-GET requests never read the cache
        assert_eq!(engine.get_default(ICAP_PIXELTYPE).unwrap(), ints(&[0]));
        assert_eq!(engine.transport().value_queries(ICAP_PIXELTYPE), 2);
    }

    #[test]
    fn unknown_capability_is_rejected_without_transport_call() {
        let mut engine = engine();

        let err = engine
            .get_values(ICAP_SUPPORTEDSIZES, GetOperation::get())
            .unwrap_err();
        assert!(matches!(err, NegotiationError::CapNotSupported(id) if id == ICAP_SUPPORTEDSIZES));
        assert!(engine.transport().calls().is_empty());

        let record = engine.last_result().unwrap();
        assert!(!record.success);
        assert_eq!(record.error_code, codes::CAP_NOT_SUPPORTED);
        assert_eq!(record.capability, ICAP_SUPPORTEDSIZES);
    }

    #[test]
    fn no_device_is_bad_source() {
        let mut engine = NegotiationEngine::new(ScriptedTransport::new().with_device(flatbed()));

        let err = engine
            .get_values(ICAP_PIXELTYPE, GetOperation::get())
            .unwrap_err();
        assert!(matches!(err, NegotiationError::BadSource));
        assert_eq!(engine.last_result().unwrap().error_code, codes::BAD_SOURCE);

        let set = engine.set_values(&ints(&[1]), ICAP_PIXELTYPE, SetOperation::set());
        assert_eq!(set.error_code, codes::BAD_SOURCE);

        assert!(!engine.is_value_supported(&Value::Integer(1), ICAP_PIXELTYPE));
        assert_eq!(engine.reset_all().error_code, codes::BAD_SOURCE);
        assert!(engine.transport().calls().is_empty());
    }

    #[test]
    fn transport_failure_keeps_native_code() {
        let mut engine = engine();

        let err = engine
            .get_values(CAP_DUPLEXENABLED, GetOperation::get())
            .unwrap_err();
        assert!(matches!(err, NegotiationError::Transport(_)));
        assert_eq!(err.code(), i32::from(ConditionCode::CAP_BAD_OPERATION.raw()));

        let record = engine.last_result().unwrap();
        assert_eq!(record.error_code, 14);
        assert_eq!(record.kind, ResultKind::Negotiation);
    }

    #[test]
    fn integer_range_is_expanded() {
        let mut engine = engine();

        let values = engine
            .get_values(ICAP_CONTRAST, GetOperation::get().with_expand_range(true))
            .unwrap();
        assert_eq!(values, ints(&[0, 2, 4, 6, 8, 10]));

        // the raw tuple is what gets cached
        assert_eq!(engine.cache().get(ICAP_CONTRAST), Some(ints(&[0, 10, 2, 4, 6])));
        let raw = engine.get_values(ICAP_CONTRAST, GetOperation::get()).unwrap();
        assert_eq!(raw.len(), 5);
    }

    #[test]
    fn float_range_is_expanded_with_tolerance() {
        let mut engine = engine();

        let values = engine
            .get_values(ICAP_BRIGHTNESS, GetOperation::get().with_expand_range(true))
            .unwrap();
        assert_eq!(values.len(), 11);
        for (k, value) in values.iter().enumerate() {
            let expected = k as f64 * 0.1;
            assert!((value.as_f64().unwrap() - expected).abs() < 1e-8);
        }
    }

    #[test]
    fn container_hint_does_not_override_the_device() {
        let mut engine = engine();
        let op = GetOperation::get()
            .with_container_type(ContainerType::Range)
            .with_expand_range(true);

        let values = engine.get_values(ICAP_CONTRAST, op).unwrap();
        assert_eq!(values.len(), 6);

        // an enumeration is left alone even when the hint claims a range
        let values = engine.get_values(ICAP_PIXELTYPE, op).unwrap();
        assert_eq!(values, ints(&[0, 1, 2]));
        assert_eq!(
            engine
                .transport()
                .count_where(|c| matches!(c, TransportCall::ContainerType(..))),
            2
        );
    }

    #[test]
    fn container_type_is_learned_once() {
        let mut engine = engine();
        let op = GetOperation::get().with_expand_range(true);

        engine.get_values(ICAP_CONTRAST, op).unwrap();
        engine.get_values(ICAP_CONTRAST, op).unwrap();
        engine.is_value_supported(&Value::Integer(4), ICAP_CONTRAST);

        assert_eq!(
            engine
                .transport()
                .count_where(|c| matches!(c, TransportCall::ContainerType(..))),
            1
        );
    }

    #[test]
    fn malformed_range_is_invalid_range() {
        let mut engine = engine();

        let err = engine
            .get_values(ICAP_UNITS, GetOperation::get().with_expand_range(true))
            .unwrap_err();
        assert!(matches!(err, NegotiationError::InvalidRange(_)));
        assert_eq!(engine.last_result().unwrap().error_code, codes::INVALID_RANGE);
    }

    #[test]
    fn non_range_is_not_expanded() {
        let mut engine = engine();
        let values = engine
            .get_values(ICAP_PIXELTYPE, GetOperation::get().with_expand_range(true))
            .unwrap();
        assert_eq!(values, ints(&[0, 1, 2]));
    }

    #[test]
    fn empty_set_sends_reset() {
        let mut engine = engine();

        let record = engine.set_values(&[], ICAP_PIXELTYPE, SetOperation::set());
        assert!(record.success);

        let (id, message, values) = engine.transport().last_set().unwrap();
        assert_eq!(id, ICAP_PIXELTYPE);
        assert_eq!(message, SetMessage::Reset);
        assert!(values.is_empty());
        assert_eq!(record.operation, OperationDescriptor::from(SetOperation::reset()));
    }

    #[test]
    fn set_sends_values_and_leaves_cache_alone() {
        let mut engine = engine();
        engine.get_values(ICAP_PIXELTYPE, GetOperation::get()).unwrap();

        let record = engine.set_values(&ints(&[1]), ICAP_PIXELTYPE, SetOperation::set());
        assert!(record.success);
        assert_eq!(record.error_code, codes::SUCCESS);
        assert_eq!(
            engine.transport().last_set(),
            Some((ICAP_PIXELTYPE, SetMessage::Set, &ints(&[1])[..]))
        );
        assert_eq!(engine.cache().get(ICAP_PIXELTYPE), Some(ints(&[0, 1, 2])));

        // callers can drop the entry themselves
        assert!(engine.invalidate_cached(ICAP_PIXELTYPE));
        assert!(!engine.cache().contains(ICAP_PIXELTYPE));
        assert!(!engine.invalidate_cached(ICAP_PIXELTYPE));
        assert_eq!(engine.get_current(ICAP_PIXELTYPE).unwrap(), ints(&[1]));
    }

    #[test]
    fn set_failure_is_recorded() {
        let mut engine = engine();

        let record = engine.set_values(
            &[Value::Boolean(true)],
            CAP_DUPLEXENABLED,
            SetOperation::set(),
        );
        assert!(!record.success);
        assert_eq!(record.error_code, 14);
        assert_eq!(engine.last_result(), Some(record));

        let rejected = engine.set_values(&ints(&[1]), ICAP_SUPPORTEDSIZES, SetOperation::set());
        assert_eq!(rejected.error_code, codes::CAP_NOT_SUPPORTED);
    }

    #[test]
    fn reset_and_reset_all() {
        let mut engine = engine();
        engine.set_values(&ints(&[1]), ICAP_PIXELTYPE, SetOperation::set());

        assert!(engine.reset(ICAP_PIXELTYPE).success);
        assert_eq!(engine.get_current(ICAP_PIXELTYPE).unwrap(), ints(&[0]));

        let record = engine.reset_all();
        assert!(record.success);
        assert_eq!(record.capability, CAP_SUPPORTEDCAPS);
        let (_, message, _) = engine.transport().last_set().unwrap();
        assert_eq!(message, SetMessage::ResetAll);
    }

    #[test]
    fn support_test_on_enumeration() {
        let mut engine = engine();

        assert!(engine.is_value_supported(&Value::Integer(2), ICAP_PIXELTYPE));
        assert!(!engine.is_value_supported(&Value::Integer(7), ICAP_PIXELTYPE));
        // type-specific equality
        assert!(!engine.is_value_supported(&Value::Float(2.0), ICAP_PIXELTYPE));

        // one fetch, then served from the cache
        assert_eq!(engine.transport().value_queries(ICAP_PIXELTYPE), 1);

        let record = engine.last_result().unwrap();
        assert_eq!(record.kind, ResultKind::SupportTest);
        assert_eq!(record.error_code, codes::VALUE_NOT_SUPPORTED);
    }

    #[test]
    fn support_test_on_ranges() {
        let mut engine = engine();

        assert!(engine.is_value_supported(&Value::Integer(6), ICAP_CONTRAST));
        assert!(!engine.is_value_supported(&Value::Integer(5), ICAP_CONTRAST));
        assert!(!engine.is_value_supported(&Value::Integer(12), ICAP_CONTRAST));

        assert!(engine.is_value_supported(&Value::Float(0.3), ICAP_BRIGHTNESS));
        assert!(!engine.is_value_supported(&Value::Float(0.35), ICAP_BRIGHTNESS));

        let record = engine.last_result().unwrap();
        assert!(record.is_support_test());
        assert!(!record.success);
    }

    #[test]
    fn support_test_of_excluded_capability_fetches_each_time() {
        let mut engine = engine();

        assert!(engine.is_value_supported(&Value::Float(300.0), ICAP_XRESOLUTION));
        assert!(!engine.is_value_supported(&Value::Float(600.0), ICAP_XRESOLUTION));
        assert_eq!(engine.transport().value_queries(ICAP_XRESOLUTION), 2);
    }

    #[test]
    fn support_test_failures_return_false() {
        let mut engine = engine();

        assert!(!engine.is_value_supported(&Value::Boolean(true), CAP_DUPLEXENABLED));
        assert_eq!(engine.transport().value_queries(CAP_DUPLEXENABLED), 1);

        assert!(!engine.is_value_supported(&Value::Integer(1), ICAP_SUPPORTEDSIZES));
        let record = engine.last_result().unwrap();
        assert_eq!(record.error_code, codes::VALUE_NOT_SUPPORTED);
        assert!(record.is_support_test());
    }

    #[test]
    fn history_is_bounded() {
        let mut engine = engine();
        for _ in 0..120 {
            let _ = engine.get_values(ICAP_PIXELTYPE, GetOperation::get());
        }
        assert_eq!(engine.history().len(), 100);

        engine.set_history_capacity(10);
        assert_eq!(engine.history().len(), 10);

        engine.set_values(&[], ICAP_PIXELTYPE, SetOperation::set());
        assert_eq!(engine.history().len(), 10);
        assert_eq!(
            engine.last_result().unwrap().operation,
            OperationDescriptor::from(SetOperation::reset())
        );
    }

    #[test]
    fn reattach_replaces_all_state() {
        let mut engine = engine();
        engine.get_values(ICAP_PIXELTYPE, GetOperation::get()).unwrap();
        assert!(engine.cache().contains(ICAP_PIXELTYPE));

        engine.detach();
        assert!(!engine.is_attached());
        assert!(engine.cache().is_empty());
        assert!(engine.history().is_empty());

        assert!(engine.attach(DeviceIdentity::new(2, "Feeder")));
        let ids: Vec<_> = engine.registry().ids().collect();
        assert_eq!(ids, vec![ICAP_SUPPORTEDSIZES]);
        assert!(engine.cache().is_empty());

        let err = engine
            .get_values(ICAP_PIXELTYPE, GetOperation::get())
            .unwrap_err();
        assert!(matches!(err, NegotiationError::CapNotSupported(_)));
        assert_eq!(
            engine
                .get_values(ICAP_SUPPORTEDSIZES, GetOperation::get())
                .unwrap(),
            ints(&[1, 2, 3])
        );
    }

    #[test]
    fn attach_without_detach_also_replaces_state() {
        let mut engine = engine();
        engine.get_values(ICAP_PIXELTYPE, GetOperation::get()).unwrap();

        engine.attach(DeviceIdentity::new(2, "Feeder"));
        assert!(!engine.registry().contains(ICAP_PIXELTYPE));
        assert!(engine.cache().get(ICAP_PIXELTYPE).is_none());
        assert_eq!(engine.device().unwrap().product_name, "Feeder");
    }

    #[test]
    fn bypass_registry_passes_every_id_through() {
        let transport = ScriptedTransport::new()
            .with_device(flatbed().with_enumeration_failure(ConditionCode::BUMMER));
        let mut engine = NegotiationEngine::new(transport);

        assert!(!engine.attach(DeviceIdentity::new(1, "Flatbed")));
        assert!(engine.is_attached());
        assert!(engine.is_capability_supported(CapabilityId::new(0x4321)));

        let values = engine
            .get_values(ICAP_CONTRAST, GetOperation::get().with_expand_range(true))
            .unwrap();
        assert_eq!(values, ints(&[0, 2, 4, 6, 8, 10]));

        // nothing is cached without a registry
        engine.get_values(ICAP_PIXELTYPE, GetOperation::get()).unwrap();
        engine.get_values(ICAP_PIXELTYPE, GetOperation::get()).unwrap();
        assert_eq!(engine.transport().value_queries(ICAP_PIXELTYPE), 2);
        assert!(engine.cache().is_empty());
    }

    #[test]
    fn get_by_name() {
        let mut engine = engine();

        let values = engine
            .get_values_by_name("ICAP_PIXELTYPE", GetOperation::get())
            .unwrap();
        assert_eq!(values.len(), 3);

        let recorded = engine.history().len();
        let err = engine
            .get_values_by_name("ICAP_NOT_A_THING", GetOperation::get())
            .unwrap_err();
        assert!(matches!(err, NegotiationError::UnknownName(_)));
        // unresolved names never reach the device and leave no record
        assert_eq!(engine.history().len(), recorded);
    }

    #[test]
    fn history_exports_as_json() {
        let mut engine = engine();
        engine.get_values(ICAP_PIXELTYPE, GetOperation::get()).unwrap();
        engine.is_value_supported(&Value::Integer(1), ICAP_PIXELTYPE);

        let json = engine.history_json().unwrap();
        let records = scancap_protocol::results_from_json(&json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, ResultKind::SupportTest);
        assert_eq!(records[1].kind, ResultKind::Negotiation);
    }
}
