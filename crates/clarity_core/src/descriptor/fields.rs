//! Field tables, one per entity kind.

use super::Descriptor::{
    Attribute, Boolean, Date, EntityList, EntityRef, Escalation, InputOutputMaps, Integer,
    Location, NamedLinks, NextActions, Placements, Text, TextList, Udf, WorkflowStages,
};
use super::FieldDef;
use crate::model::kind::EntityKind;

const fn limsid() -> FieldDef {
    FieldDef::new("limsid", Attribute("limsid")).read_only()
}

static ARTIFACT: &[FieldDef] = &[
    limsid(),
    FieldDef::new("name", Text(&["name"])),
    FieldDef::new("type", Text(&["type"])),
    FieldDef::new("output_type", Text(&["output-type"])),
    FieldDef::new("qc_flag", Text(&["qc-flag"])),
    FieldDef::new("location", Location),
    FieldDef::new("working_flag", Boolean(&["working-flag"])),
    FieldDef::new(
        "samples",
        EntityList {
            path: &["sample"],
            kind: EntityKind::Sample,
        },
    ),
    FieldDef::new(
        "parent_process",
        EntityRef {
            path: &["parent-process"],
            kind: EntityKind::Process,
        },
    ),
    FieldDef::new("udf", Udf(&[])),
    FieldDef::new("workflow_stages", WorkflowStages),
];

static SAMPLE: &[FieldDef] = &[
    limsid(),
    FieldDef::new("name", Text(&["name"])),
    FieldDef::new("date_received", Date(&["date-received"])),
    FieldDef::new("date_completed", Date(&["date-completed"])),
    FieldDef::new(
        "project",
        EntityRef {
            path: &["project"],
            kind: EntityKind::Project,
        },
    ),
    FieldDef::new(
        "submitter",
        EntityRef {
            path: &["submitter"],
            kind: EntityKind::Researcher,
        },
    ),
    FieldDef::new(
        "artifact",
        EntityRef {
            path: &["artifact"],
            kind: EntityKind::Artifact,
        },
    ),
    FieldDef::new("location", Location),
    FieldDef::new("udf", Udf(&[])),
];

static CONTAINER: &[FieldDef] = &[
    limsid(),
    FieldDef::new("name", Text(&["name"])),
    FieldDef::new(
        "type",
        EntityRef {
            path: &["type"],
            kind: EntityKind::ContainerType,
        },
    ),
    FieldDef::new("occupied_wells", Integer(&["occupied-wells"])),
    FieldDef::new(
        "placements",
        EntityList {
            path: &["placement"],
            kind: EntityKind::Artifact,
        },
    ),
    FieldDef::new("state", Text(&["state"])),
    FieldDef::new("udf", Udf(&[])),
];

static CONTAINER_TYPE: &[FieldDef] = &[
    FieldDef::new("name", Attribute("name")),
    FieldDef::new("is_tube", Boolean(&["is-tube"])),
    FieldDef::new("x_size", Integer(&["x-dimension", "size"])),
    FieldDef::new("y_size", Integer(&["y-dimension", "size"])),
];

static PROJECT: &[FieldDef] = &[
    limsid(),
    FieldDef::new("name", Text(&["name"])),
    FieldDef::new("open_date", Date(&["open-date"])),
    FieldDef::new("close_date", Date(&["close-date"])),
    FieldDef::new("invoice_date", Date(&["invoice-date"])),
    FieldDef::new(
        "researcher",
        EntityRef {
            path: &["researcher"],
            kind: EntityKind::Researcher,
        },
    ),
    FieldDef::new("udf", Udf(&[])),
];

static RESEARCHER: &[FieldDef] = &[
    FieldDef::new("first_name", Text(&["first-name"])),
    FieldDef::new("last_name", Text(&["last-name"])),
    FieldDef::new("phone", Text(&["phone"])),
    FieldDef::new("fax", Text(&["fax"])),
    FieldDef::new("email", Text(&["email"])),
    FieldDef::new("initials", Text(&["initials"])),
    FieldDef::new("username", Text(&["credentials", "username"])),
    FieldDef::new("account_locked", Boolean(&["credentials", "account-locked"])),
    FieldDef::new("udf", Udf(&[])),
];

static PROCESS: &[FieldDef] = &[
    limsid(),
    FieldDef::new("type", Text(&["type"])),
    FieldDef::new("date_run", Date(&["date-run"])),
    FieldDef::new(
        "technician",
        EntityRef {
            path: &["technician"],
            kind: EntityKind::Researcher,
        },
    ),
    FieldDef::new("protocol_name", Text(&["protocol-name"])),
    FieldDef::new("input_output_maps", InputOutputMaps(&["input-output-map"])),
    FieldDef::new(
        "step",
        EntityRef {
            path: &["step"],
            kind: EntityKind::Step,
        },
    ),
    FieldDef::new("udf", Udf(&[])),
];

static STEP: &[FieldDef] = &[
    limsid(),
    FieldDef::new("current_state", Attribute("current-state")),
    FieldDef::new(
        "configuration",
        EntityRef {
            path: &["configuration"],
            kind: EntityKind::ProtocolStep,
        },
    ),
    FieldDef::new("date_started", Text(&["date-started"])).read_only(),
    FieldDef::new("date_completed", Text(&["date-completed"])).read_only(),
    FieldDef::new(
        "actions",
        EntityRef {
            path: &["actions"],
            kind: EntityKind::StepActions,
        },
    )
    .read_only(),
    FieldDef::new(
        "placements",
        EntityRef {
            path: &["placements"],
            kind: EntityKind::StepPlacements,
        },
    )
    .read_only(),
    FieldDef::new(
        "details",
        EntityRef {
            path: &["details"],
            kind: EntityKind::StepDetails,
        },
    )
    .read_only(),
    FieldDef::new(
        "program_status",
        EntityRef {
            path: &["program-status"],
            kind: EntityKind::ProgramStatus,
        },
    )
    .read_only(),
    FieldDef::new(
        "available_programs",
        NamedLinks(&["available-programs", "available-program"]),
    ),
];

const fn step_link() -> FieldDef {
    FieldDef::new(
        "step",
        EntityRef {
            path: &["step"],
            kind: EntityKind::Step,
        },
    )
    .read_only()
}

const fn step_configuration() -> FieldDef {
    FieldDef::new(
        "configuration",
        EntityRef {
            path: &["configuration"],
            kind: EntityKind::ProtocolStep,
        },
    )
    .read_only()
}

static STEP_ACTIONS: &[FieldDef] = &[
    step_link(),
    step_configuration(),
    FieldDef::new("next_actions", NextActions),
    FieldDef::new("escalation", Escalation),
];

static STEP_PLACEMENTS: &[FieldDef] = &[
    step_link(),
    step_configuration(),
    FieldDef::new(
        "selected_containers",
        EntityList {
            path: &["selected-containers", "container"],
            kind: EntityKind::Container,
        },
    ),
    FieldDef::new("placement_list", Placements),
];

static STEP_DETAILS: &[FieldDef] = &[
    step_link(),
    step_configuration(),
    FieldDef::new(
        "input_output_maps",
        InputOutputMaps(&["input-output-maps", "input-output-map"]),
    ),
    FieldDef::new("udf", Udf(&["fields"])),
];

static PROGRAM_STATUS: &[FieldDef] = &[
    step_link(),
    step_configuration(),
    FieldDef::new("status", Text(&["status"])).read_only(),
    FieldDef::new("message", Text(&["message"])).read_only(),
];

static REAGENT_KIT: &[FieldDef] = &[
    FieldDef::new("name", Text(&["name"])),
    FieldDef::new("supplier", Text(&["supplier"])),
    FieldDef::new("website", Text(&["website"])),
    FieldDef::new("catalogue_number", Text(&["catalogue-number"])),
    FieldDef::new("archived", Boolean(&["archived"])),
];

static REAGENT_LOT: &[FieldDef] = &[
    limsid(),
    FieldDef::new(
        "reagent_kit",
        EntityRef {
            path: &["reagent-kit"],
            kind: EntityKind::ReagentKit,
        },
    ),
    FieldDef::new("name", Text(&["name"])),
    FieldDef::new("lot_number", Text(&["lot-number"])),
    FieldDef::new("created_date", Date(&["created-date"])).read_only(),
    FieldDef::new("last_modified_date", Date(&["last-modified-date"])).read_only(),
    FieldDef::new("expiry_date", Date(&["expiry-date"])),
    FieldDef::new(
        "created_by",
        EntityRef {
            path: &["created-by"],
            kind: EntityKind::Researcher,
        },
    )
    .read_only(),
    FieldDef::new(
        "last_modified_by",
        EntityRef {
            path: &["last-modified-by"],
            kind: EntityKind::Researcher,
        },
    )
    .read_only(),
    FieldDef::new("status", Text(&["status"])),
    FieldDef::new("usage_count", Integer(&["usage-count"])).read_only(),
];

static STAGE: &[FieldDef] = &[
    FieldDef::new("name", Attribute("name")).read_only(),
    FieldDef::new("index", Attribute("index")).read_only(),
    FieldDef::new(
        "workflow",
        EntityRef {
            path: &["workflow"],
            kind: EntityKind::Workflow,
        },
    )
    .read_only(),
    FieldDef::new(
        "protocol",
        EntityRef {
            path: &["protocol"],
            kind: EntityKind::Protocol,
        },
    )
    .read_only(),
    FieldDef::new(
        "step",
        EntityRef {
            path: &["step"],
            kind: EntityKind::ProtocolStep,
        },
    )
    .read_only(),
];

static WORKFLOW: &[FieldDef] = &[
    FieldDef::new("name", Attribute("name")).read_only(),
    FieldDef::new("status", Attribute("status")),
    FieldDef::new(
        "protocols",
        EntityList {
            path: &["protocols", "protocol"],
            kind: EntityKind::Protocol,
        },
    ),
    FieldDef::new(
        "stages",
        EntityList {
            path: &["stages", "stage"],
            kind: EntityKind::Stage,
        },
    ),
];

static PROTOCOL: &[FieldDef] = &[
    FieldDef::new("name", Attribute("name")).read_only(),
    FieldDef::new("index", Attribute("index")).read_only(),
    FieldDef::new(
        "steps",
        EntityList {
            path: &["steps", "step"],
            kind: EntityKind::ProtocolStep,
        },
    ),
];

static PROTOCOL_STEP: &[FieldDef] = &[
    FieldDef::new("name", Attribute("name")).read_only(),
    FieldDef::new("protocol_step_index", Attribute("protocol-step-index")).read_only(),
    FieldDef::new(
        "permitted_containers",
        TextList(&["permitted-containers", "container-type"]),
    ),
];

/// Every field declared for `kind`, in declaration order.
pub fn fields_of(kind: EntityKind) -> &'static [FieldDef] {
    match kind {
        EntityKind::Artifact => ARTIFACT,
        EntityKind::Sample => SAMPLE,
        EntityKind::Container => CONTAINER,
        EntityKind::ContainerType => CONTAINER_TYPE,
        EntityKind::Project => PROJECT,
        EntityKind::Researcher => RESEARCHER,
        EntityKind::Process => PROCESS,
        EntityKind::Step => STEP,
        EntityKind::StepActions => STEP_ACTIONS,
        EntityKind::StepPlacements => STEP_PLACEMENTS,
        EntityKind::StepDetails => STEP_DETAILS,
        EntityKind::ProgramStatus => PROGRAM_STATUS,
        EntityKind::ReagentKit => REAGENT_KIT,
        EntityKind::ReagentLot => REAGENT_LOT,
        EntityKind::Stage => STAGE,
        EntityKind::Workflow => WORKFLOW,
        EntityKind::Protocol => PROTOCOL,
        EntityKind::ProtocolStep => PROTOCOL_STEP,
    }
}

pub fn field_def(kind: EntityKind, name: &str) -> Option<&'static FieldDef> {
    fields_of(kind).iter().find(|def| def.name == name)
}

#[cfg(test)]
mod tests {
    use super::{field_def, fields_of};
    use crate::model::kind::EntityKind;
    use std::collections::HashSet;

    #[test]
    fn field_names_are_unique_per_kind() {
        for kind in EntityKind::ALL {
            let fields = fields_of(kind);
            let names: HashSet<&str> = fields.iter().map(|def| def.name).collect();
            assert_eq!(names.len(), fields.len(), "duplicate field on {}", kind.name());
        }
    }

    #[test]
    fn lookups_are_scoped_to_the_kind() {
        assert!(field_def(EntityKind::Step, "available_programs").is_some());
        assert!(field_def(EntityKind::Artifact, "available_programs").is_none());
        assert!(!field_def(EntityKind::Step, "date_started").unwrap().writable);
    }
}
