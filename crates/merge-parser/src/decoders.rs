// crates/merge-parser/src/decoders.rs
// ============================================================================
// Module: Per-Type Content Decoders
// Description: Translates the generic XML tree into the canonical content
//              view for each of the twelve recognized object types.
// Purpose: Implement the type-specific half of spec §4.2's decode step; the
//          Content Canonicalizer (merge-core) later normalizes ordering.
// Dependencies: merge-core, crate::tree
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use merge_core::CdtView;
use merge_core::ConnectedSystemView;
use merge_core::ConstantView;
use merge_core::ContentView;
use merge_core::DataStoreView;
use merge_core::ExpressionRuleView;
use merge_core::Field;
use merge_core::GroupView;
use merge_core::IntegrationView;
use merge_core::InterfaceView;
use merge_core::ObjectType;
use merge_core::ProcessFlow;
use merge_core::ProcessModelView;
use merge_core::ProcessNode;
use merge_core::ProcessVariable;
use merge_core::RecordTypeView;
use merge_core::Relationship;
use merge_core::SitePage;
use merge_core::SiteView;

use crate::tree::XmlElement;

/// Decodes the type-specific content payload for a recognized object type.
/// Returns `None` for `Unknown`; the caller substitutes the raw-bytes view.
#[must_use]
pub fn decode_content(object_type: ObjectType, root: &XmlElement) -> Option<ContentView> {
    match object_type {
        ObjectType::Interface => Some(ContentView::Interface(decode_interface(root))),
        ObjectType::ExpressionRule => Some(ContentView::ExpressionRule(decode_rule(root))),
        ObjectType::Integration | ObjectType::WebApi => {
            Some(ContentView::Integration(decode_integration(root)))
        }
        ObjectType::ProcessModel => Some(ContentView::ProcessModel(decode_process_model(root))),
        ObjectType::RecordType => Some(ContentView::RecordType(decode_record_type(root))),
        ObjectType::Cdt => Some(ContentView::Cdt(decode_cdt(root))),
        ObjectType::Constant => Some(ContentView::Constant(decode_constant(root))),
        ObjectType::Site => Some(ContentView::Site(decode_site(root))),
        ObjectType::Group => Some(ContentView::Group(decode_group(root))),
        ObjectType::ConnectedSystem => {
            Some(ContentView::ConnectedSystem(decode_connected_system(root)))
        }
        ObjectType::DataStore => Some(ContentView::DataStore(decode_data_store(root))),
        ObjectType::Unknown => None,
    }
}

fn decode_interface(root: &XmlElement) -> InterfaceView {
    InterfaceView {
        code: root.child_text("code").unwrap_or_default(),
        parameters: decode_field_list(root, "parameters", "parameter"),
        security: root.child_text("security").unwrap_or_default(),
    }
}

fn decode_rule(root: &XmlElement) -> ExpressionRuleView {
    ExpressionRuleView {
        code: root.child_text("code").unwrap_or_default(),
        inputs: decode_field_list(root, "inputs", "input"),
        output_type: root.child_text("outputType").unwrap_or_default(),
    }
}

fn decode_integration(root: &XmlElement) -> IntegrationView {
    let methods = root
        .child("methods")
        .map(|methods| {
            methods.children_named("method").map(|m| m.text.trim().to_string()).collect()
        })
        .unwrap_or_default();
    IntegrationView {
        code: root.child_text("code").unwrap_or_default(),
        endpoint: root.child_text("endpoint").unwrap_or_default(),
        methods,
        auth_descriptor: root.child_text("authDescriptor").unwrap_or_default(),
    }
}

fn decode_process_model(root: &XmlElement) -> ProcessModelView {
    let nodes = root
        .child("nodes")
        .map(|nodes| nodes.children_named("node").map(decode_process_node).collect())
        .unwrap_or_default();
    let flows = root
        .child("flows")
        .map(|flows| flows.children_named("flow").map(decode_process_flow).collect())
        .unwrap_or_default();
    let variables = root
        .child("variables")
        .map(|vars| vars.children_named("variable").map(decode_process_variable).collect())
        .unwrap_or_default();
    ProcessModelView { nodes, flows, variables }
}

fn decode_process_node(node: &XmlElement) -> ProcessNode {
    let properties = node
        .child("properties")
        .map(|props| {
            props
                .children_named("property")
                .map(|p| {
                    (p.child_text("key").unwrap_or_default(), p.child_text("value").unwrap_or_default())
                })
                .collect()
        })
        .unwrap_or_default();
    ProcessNode {
        uuid: node.child_text("uuid").unwrap_or_default(),
        name: node.child_text("name").unwrap_or_default(),
        node_type: node.child_text("type").unwrap_or_default(),
        properties,
    }
}

fn decode_process_flow(flow: &XmlElement) -> ProcessFlow {
    ProcessFlow {
        source: flow.child_text("source").unwrap_or_default(),
        target: flow.child_text("target").unwrap_or_default(),
        condition: flow.child_text("condition"),
    }
}

fn decode_process_variable(var: &XmlElement) -> ProcessVariable {
    ProcessVariable {
        name: var.child_text("name").unwrap_or_default(),
        var_type: var.child_text("type").unwrap_or_default(),
        default: var.child_text("default"),
    }
}

fn decode_record_type(root: &XmlElement) -> RecordTypeView {
    let relationships = root
        .child("relationships")
        .map(|rels| {
            rels.children_named("relationship")
                .map(|r| Relationship {
                    name: r.child_text("name").unwrap_or_default(),
                    related_uuid: r.child_text("relatedUuid").unwrap_or_default(),
                })
                .collect()
        })
        .unwrap_or_default();
    let views = root
        .child("views")
        .map(|views| views.children_named("view").map(|v| v.text.trim().to_string()).collect())
        .unwrap_or_default();
    let actions = root
        .child("actions")
        .map(|actions| actions.children_named("action").map(|a| a.text.trim().to_string()).collect())
        .unwrap_or_default();
    RecordTypeView { fields: decode_field_list(root, "fields", "field"), relationships, views, actions }
}

fn decode_cdt(root: &XmlElement) -> CdtView {
    CdtView { fields: decode_field_list(root, "fields", "field") }
}

fn decode_constant(root: &XmlElement) -> ConstantView {
    let raw_value = root.child_text("value").unwrap_or_default();
    let value = serde_json::from_str(&raw_value)
        .unwrap_or_else(|_| serde_json::Value::String(raw_value));
    ConstantView {
        value,
        data_type: root.child_text("dataType").unwrap_or_default(),
        scope: root.child_text("scope").unwrap_or_default(),
    }
}

fn decode_site(root: &XmlElement) -> SiteView {
    let pages = root
        .child("pages")
        .map(|pages| pages.children_named("page").map(decode_site_page).collect())
        .unwrap_or_default();
    SiteView { pages }
}

fn decode_site_page(page: &XmlElement) -> SitePage {
    let children = page
        .child("children")
        .map(|kids| kids.children_named("page").map(decode_site_page).collect())
        .unwrap_or_default();
    SitePage {
        uuid: page.child_text("uuid").unwrap_or_default(),
        name: page.child_text("name").unwrap_or_default(),
        children,
    }
}

fn decode_group(root: &XmlElement) -> GroupView {
    let members = root
        .child("members")
        .map(|members| {
            members.children_named("member").map(|m| m.text.trim().to_string()).collect()
        })
        .unwrap_or_default();
    GroupView { parent_uuid: root.child_text("parentUuid"), members }
}

fn decode_connected_system(root: &XmlElement) -> ConnectedSystemView {
    ConnectedSystemView {
        system_type: root.child_text("systemType").unwrap_or_default(),
        properties: decode_property_map(root),
    }
}

fn decode_data_store(root: &XmlElement) -> DataStoreView {
    let entities = root
        .child("entities")
        .map(|entities| {
            entities.children_named("entity").map(|e| e.text.trim().to_string()).collect()
        })
        .unwrap_or_default();
    DataStoreView { entities }
}

fn decode_field_list(root: &XmlElement, list_tag: &str, item_tag: &str) -> BTreeSet<Field> {
    root.child(list_tag)
        .map(|list| {
            list.children_named(item_tag)
                .map(|item| Field {
                    name: item.child_text("name").unwrap_or_default(),
                    field_type: item.child_text("type").unwrap_or_default(),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn decode_property_map(root: &XmlElement) -> BTreeMap<String, String> {
    root.child("properties")
        .map(|props| {
            props
                .children_named("property")
                .map(|p| {
                    (p.child_text("key").unwrap_or_default(), p.child_text("value").unwrap_or_default())
                })
                .collect()
        })
        .unwrap_or_default()
}
