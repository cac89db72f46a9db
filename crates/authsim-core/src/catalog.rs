//! Step catalog.
//!
//! A catalog is the fixed, ordered script of a simulation run. Once built it
//! never changes: the engine copies statuses next to it but never edits the
//! definitions themselves.
//!
//! # Validation
//!
//! [`StepCatalog::new`] rejects:
//! - an empty step list (the engine divides by the step count)
//! - zero ids, duplicate ids, and ids that do not increase in catalog order
//! - zero nominal durations

use std::{io, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CodecError};

/// Endpoint taking part in a protocol step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Participant {
    /// The medical device being authenticated.
    Device,
    /// The data collector authenticating the device.
    Collector,
    /// Local computation on the sending side, nothing on the wire.
    System,
}

impl Participant {
    /// Human readable endpoint name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Device => "IoMT Device",
            Self::Collector => "Data Collector",
            Self::System => "System",
        }
    }
}

/// Definition of one protocol step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDefinition {
    /// Positive id, increasing in catalog order.
    pub id: u32,
    /// Short title.
    pub title: String,
    /// One-sentence description.
    pub description: String,
    /// Endpoint performing the step.
    pub sender: Participant,
    /// Endpoint receiving the result.
    pub receiver: Participant,
    /// Wire message text, only for steps that model a transmission.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Sub-operation labels, display only.
    #[serde(default)]
    pub operations: Vec<String>,
    /// Simulated time the step takes before the engine moves past it.
    #[serde(rename = "duration_ms", with = "duration_ms")]
    pub nominal_duration: Duration,
}

impl StepDefinition {
    /// Create a step with no wire message and no operations.
    pub fn new(
        id: u32,
        title: impl Into<String>,
        description: impl Into<String>,
        sender: Participant,
        receiver: Participant,
        nominal_duration: Duration,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            sender,
            receiver,
            message: None,
            operations: Vec::new(),
            nominal_duration,
        }
    }

    /// Attach the wire message this step transmits.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Replace the operation labels.
    #[must_use]
    pub fn with_operations<I, S>(mut self, operations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.operations = operations.into_iter().map(Into::into).collect();
        self
    }

    /// Whether this step models a wire transmission.
    pub fn is_transmission(&self) -> bool {
        self.message.is_some()
    }
}

/// Validated, immutable, ordered list of steps.
///
/// Cloning is cheap: definitions are shared behind an [`Arc`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCatalog {
    steps: Arc<[Arc<StepDefinition>]>,
}

impl StepCatalog {
    /// Validate and freeze a list of steps.
    pub fn new(steps: Vec<StepDefinition>) -> Result<Self, CatalogError> {
        if steps.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut previous: Option<u32> = None;
        for (index, step) in steps.iter().enumerate() {
            if step.id == 0 {
                return Err(CatalogError::ZeroId { index });
            }
            if let Some(previous) = previous {
                if step.id == previous {
                    return Err(CatalogError::DuplicateId { id: step.id });
                }
                if step.id < previous {
                    return Err(CatalogError::OutOfOrder { index, id: step.id, previous });
                }
            }
            if step.nominal_duration.is_zero() {
                return Err(CatalogError::ZeroDuration { id: step.id });
            }
            previous = Some(step.id);
        }

        Ok(Self { steps: steps.into_iter().map(Arc::new).collect() })
    }

    /// Number of steps. Never zero.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always `false`; construction rejects empty catalogs.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step at `index`, if in range.
    pub fn at(&self, index: usize) -> Option<&StepDefinition> {
        self.steps.get(index).map(Arc::as_ref)
    }

    /// Iterate steps in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &StepDefinition> {
        self.steps.iter().map(Arc::as_ref)
    }

    /// Shared handle to the step at `index`.
    pub(crate) fn shared(&self, index: usize) -> Option<Arc<StepDefinition>> {
        self.steps.get(index).cloned()
    }

    /// Sum of all nominal durations.
    pub fn total_duration(&self) -> Duration {
        self.iter().map(|step| step.nominal_duration).sum()
    }

    /// Decode a catalog from CBOR and validate it.
    pub fn from_cbor<R: io::Read>(reader: R) -> Result<Self, CodecError> {
        let steps: Vec<StepDefinition> =
            ciborium::from_reader(reader).map_err(|e| CodecError::Decode(e.to_string()))?;
        Ok(Self::new(steps)?)
    }

    /// Encode the catalog as a CBOR array of steps.
    pub fn to_cbor<W: io::Write>(&self, writer: W) -> Result<(), CodecError> {
        ciborium::into_writer(&*self.steps, writer).map_err(|e| CodecError::Encode(e.to_string()))
    }

    /// The seven-step IoMT mutual authentication flow between a medical
    /// device and a data collector.
    #[allow(clippy::too_many_lines)]
    pub fn iomt_authentication() -> Self {
        use Participant::{Collector, Device, System};

        let steps = vec![
            StepDefinition::new(
                1,
                "IoMT Device Initiation",
                "IoMT device generates session parameters and computes shared secret",
                Device,
                System,
                Duration::from_millis(2000),
            )
            .with_operations([
                "Generate SK_IM, S_x, TM_x",
                "Compute SK_DC-IM = SK_IM · Pb_DC",
                "Compute α = h(PID_IM || SK_DC-IM || TM_x || h(Pb_IM))",
                "Split α into α_a, α_b (128 bits each)",
                "Compute K_IM = α_a ⊕ α_b, N_x = α_a",
                "ASCON Encrypt: (CT_x, Tag_x) = E_K_IM{N_x, S_x}",
            ]),
            StepDefinition::new(
                2,
                "Authentication Request",
                "IoMT device sends authentication message to Data Collector",
                Device,
                Collector,
                Duration::from_millis(1500),
            )
            .with_message("MSG1: {TM_x, CT_x, Tag_x, h(Pb_IM)}")
            .with_operations([
                "Transmit encrypted authentication request",
                "Include timestamp and device hash",
            ]),
            StepDefinition::new(
                3,
                "DC Validation & Processing",
                "Data Collector validates timestamp and authenticates the device",
                Collector,
                System,
                Duration::from_millis(2500),
            )
            .with_operations([
                "Validate timestamp: ΔT ≥ |TM* - TM_x|",
                "Compute SK_DC-IM = SK_DC · Pb_IM1",
                "Extract PID_IM using h(Pb_IM) from ledger",
                "Compute β = h(PID_IM || SK_DC-IM || TM_x || h(Pb_IM))",
                "Split β into β_a, β_b and compute K_DC = β_a ⊕ β_b",
                "ASCON Decrypt: (PT_y, Tag_y) = D_K_DC{N_y, CT_x}",
                "Validate Tag_y = Tag_x for message authenticity",
            ]),
            StepDefinition::new(
                4,
                "DC Response Generation",
                "Data Collector generates response message with session parameters",
                Collector,
                System,
                Duration::from_millis(2200),
            )
            .with_operations([
                "Retrieve {CT_DC, Tag_DC} from globalchain using PID_IM",
                "Validate blockchain data authenticity",
                "Generate TM_z, S_z parameters",
                "Compute γ = h(SK_DC-IM || ID_IM || h(Pb_IM) || TM_z || S_x)",
                "Split γ into γ_a, γ_b and compute AD_z = γ_a ⊕ γ_b",
                "ASCON Encrypt: (CT_z, Tag_z) = E_Pb_IM{AD_z, N_z, PT_z}",
                "Compute session key: SS_DC = h(γ || S_x || S_z || TM_z)",
            ]),
            StepDefinition::new(
                5,
                "Authentication Response",
                "Data Collector sends response back to IoMT device",
                Collector,
                Device,
                Duration::from_millis(1500),
            )
            .with_message("MSG2: {TM_z, CT_z, Tag_z}")
            .with_operations(["Transmit encrypted response", "Include session parameters"]),
            StepDefinition::new(
                6,
                "IoMT Final Validation",
                "IoMT device validates response and establishes session key",
                Device,
                System,
                Duration::from_millis(2000),
            )
            .with_operations([
                "Validate timestamp: ΔT ≥ |TM* - TM_z|",
                "Compute δ = h(SK_DC-IM || ID_IM || h(Pb_IM) || TM_z || S_x)",
                "Split δ into δ_a, δ_b and compute AD_p = δ_a ⊕ δ_b",
                "ASCON Decrypt: (PT_z, Tag_p) = D_Pb_IM{AD_p, N_p, CT_z}",
                "Validate Tag_p = Tag_z for message authenticity",
                "Extract S_z from PT_z",
                "Compute session key: SS_IM = h(δ || S_x || S_z || TM_z)",
            ]),
            StepDefinition::new(
                7,
                "Session Established",
                "Mutual authentication completed, secure session key established",
                System,
                System,
                Duration::from_millis(1000),
            )
            .with_operations([
                "Session keys match: SS_DC = SS_IM",
                "Secure communication channel established",
                "Authentication protocol completed successfully",
            ]),
        ];

        Self { steps: steps.into_iter().map(Arc::new).collect() }
    }
}

impl Default for StepCatalog {
    fn default() -> Self {
        Self::iomt_authentication()
    }
}

/// Durations travel as whole milliseconds.
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        value: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
