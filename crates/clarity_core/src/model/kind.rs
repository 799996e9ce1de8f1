//! Entity kinds and their wire identity.
//!
//! # Responsibility
//! - Name every entity kind the mapper understands.
//! - Record each kind's namespace, root tag, preferred prefix and API path.
//!
//! # Invariants
//! - `(namespace, root_tag)` is unique across kinds; several kinds may share
//!   a namespace (all step sub-resources use the step namespace) or a root
//!   tag (`step` exists in both the step and protocol namespaces).

use serde::{Deserialize, Serialize};

/// Namespace URIs used by the API.
pub mod ns {
    pub const ARTIFACT: &str = "http://genologics.com/ri/artifact";
    pub const CONTAINER: &str = "http://genologics.com/ri/container";
    pub const CONTAINER_TYPE: &str = "http://genologics.com/ri/containertype";
    pub const EXCEPTION: &str = "http://genologics.com/ri/exception";
    pub const PROCESS: &str = "http://genologics.com/ri/process";
    pub const PROJECT: &str = "http://genologics.com/ri/project";
    pub const PROTOCOL: &str = "http://genologics.com/ri/protocolconfiguration";
    pub const REAGENT_KIT: &str = "http://genologics.com/ri/reagentkit";
    pub const REAGENT_LOT: &str = "http://genologics.com/ri/reagentlot";
    pub const RESEARCHER: &str = "http://genologics.com/ri/researcher";
    pub const SAMPLE: &str = "http://genologics.com/ri/sample";
    pub const STAGE: &str = "http://genologics.com/ri/stage";
    pub const STEP: &str = "http://genologics.com/ri/step";
    pub const UDF: &str = "http://genologics.com/ri/userdefined";
    pub const WORKFLOW: &str = "http://genologics.com/ri/workflowconfiguration";
}

/// Every entity kind with a registered root element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Physical or derived material produced by a process.
    Artifact,
    Sample,
    Container,
    ContainerType,
    Project,
    Researcher,
    Process,
    /// Running or completed protocol step.
    Step,
    /// `steps/{id}/actions`: next actions and escalation.
    StepActions,
    /// `steps/{id}/placements`: output artifact locations.
    StepPlacements,
    /// `steps/{id}/details`: step-level fields and input/output maps.
    StepDetails,
    /// Result of triggering an automation program on a step.
    ProgramStatus,
    ReagentKit,
    ReagentLot,
    Stage,
    Workflow,
    Protocol,
    /// Step definition inside a protocol configuration.
    ProtocolStep,
}

/// Static wire identity of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindSpec {
    pub namespace: &'static str,
    pub prefix: &'static str,
    pub root_tag: &'static str,
    /// Distinct root used when POSTing a new resource, if any.
    pub creation_tag: Option<&'static str>,
    /// Collection path under `/api/{version}/`; `None` for sub-resources.
    pub uri_segment: Option<&'static str>,
}

impl KindSpec {
    const fn new(namespace: &'static str, prefix: &'static str, root_tag: &'static str) -> Self {
        Self {
            namespace,
            prefix,
            root_tag,
            creation_tag: None,
            uri_segment: None,
        }
    }

    const fn segment(mut self, segment: &'static str) -> Self {
        self.uri_segment = Some(segment);
        self
    }

    const fn creation(mut self, tag: &'static str) -> Self {
        self.creation_tag = Some(tag);
        self
    }
}

impl EntityKind {
    pub const ALL: [EntityKind; 18] = [
        Self::Artifact,
        Self::Sample,
        Self::Container,
        Self::ContainerType,
        Self::Project,
        Self::Researcher,
        Self::Process,
        Self::Step,
        Self::StepActions,
        Self::StepPlacements,
        Self::StepDetails,
        Self::ProgramStatus,
        Self::ReagentKit,
        Self::ReagentLot,
        Self::Stage,
        Self::Workflow,
        Self::Protocol,
        Self::ProtocolStep,
    ];

    pub const fn spec(self) -> KindSpec {
        match self {
            Self::Artifact => KindSpec::new(ns::ARTIFACT, "art", "artifact").segment("artifacts"),
            Self::Sample => KindSpec::new(ns::SAMPLE, "smp", "sample")
                .segment("samples")
                .creation("samplecreation"),
            Self::Container => {
                KindSpec::new(ns::CONTAINER, "con", "container").segment("containers")
            }
            Self::ContainerType => KindSpec::new(ns::CONTAINER_TYPE, "ctp", "container-type")
                .segment("containertypes"),
            Self::Project => KindSpec::new(ns::PROJECT, "prj", "project").segment("projects"),
            Self::Researcher => {
                KindSpec::new(ns::RESEARCHER, "res", "researcher").segment("researchers")
            }
            Self::Process => KindSpec::new(ns::PROCESS, "prc", "process").segment("processes"),
            Self::Step => KindSpec::new(ns::STEP, "stp", "step")
                .segment("steps")
                .creation("step-creation"),
            Self::StepActions => KindSpec::new(ns::STEP, "stp", "actions"),
            Self::StepPlacements => KindSpec::new(ns::STEP, "stp", "placements"),
            Self::StepDetails => KindSpec::new(ns::STEP, "stp", "details"),
            Self::ProgramStatus => KindSpec::new(ns::STEP, "stp", "program-status"),
            Self::ReagentKit => {
                KindSpec::new(ns::REAGENT_KIT, "kit", "reagent-kit").segment("reagentkits")
            }
            Self::ReagentLot => {
                KindSpec::new(ns::REAGENT_LOT, "lot", "reagent-lot").segment("reagentlots")
            }
            Self::Stage => KindSpec::new(ns::STAGE, "stg", "stage"),
            Self::Workflow => KindSpec::new(ns::WORKFLOW, "wkfcnf", "workflow")
                .segment("configuration/workflows"),
            Self::Protocol => KindSpec::new(ns::PROTOCOL, "protcnf", "protocol")
                .segment("configuration/protocols"),
            Self::ProtocolStep => KindSpec::new(ns::PROTOCOL, "protcnf", "step"),
        }
    }

    /// Human-readable kind name used in logs and errors.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Artifact => "Artifact",
            Self::Sample => "Sample",
            Self::Container => "Container",
            Self::ContainerType => "ContainerType",
            Self::Project => "Project",
            Self::Researcher => "Researcher",
            Self::Process => "Process",
            Self::Step => "Step",
            Self::StepActions => "StepActions",
            Self::StepPlacements => "StepPlacements",
            Self::StepDetails => "StepDetails",
            Self::ProgramStatus => "ProgramStatus",
            Self::ReagentKit => "ReagentKit",
            Self::ReagentLot => "ReagentLot",
            Self::Stage => "Stage",
            Self::Workflow => "Workflow",
            Self::Protocol => "Protocol",
            Self::ProtocolStep => "ProtocolStep",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EntityKind;
    use std::collections::HashSet;

    #[test]
    fn namespace_and_root_tag_pairs_are_unique() {
        let mut seen = HashSet::new();
        for kind in EntityKind::ALL {
            let spec = kind.spec();
            assert!(
                seen.insert((spec.namespace, spec.root_tag)),
                "duplicate root for {}",
                kind.name()
            );
        }
    }

    #[test]
    fn step_and_protocol_step_share_local_tag_only() {
        let step = EntityKind::Step.spec();
        let protocol_step = EntityKind::ProtocolStep.spec();
        assert_eq!(step.root_tag, protocol_step.root_tag);
        assert_ne!(step.namespace, protocol_step.namespace);
    }
}
