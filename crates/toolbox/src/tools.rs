//! Toolbox identity, the tool manifest and the payloads tools hand back to the UI.

use meili::Hit;
use serde::Serialize;
use serde_json::Value;

pub const NAMESPACE: &str = "gd-meilisearch";
pub const TITLE: &str = "Meilisearch";
pub const DESCRIPTION: &str = "Hybrid Search Tools";

/// Handler id of the search task, `<namespace>.<task name>`.
pub const SEARCH_HANDLER_ID: &str = "gd-meilisearch.search_handler";

pub const SEARCH_TOOL: &str = "search";

/// Everything a client needs to render the toolbox.
#[derive(Debug, Serialize)]
pub struct Manifest {
    pub ns: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub tools: Vec<ToolInfo>,
    pub tasks: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ToolInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Argument name -> human label.
    pub args: Value,
    pub examples: Vec<&'static str>,
}

pub fn manifest() -> Manifest {
    Manifest {
        ns: NAMESPACE,
        title: TITLE,
        description: DESCRIPTION,
        tools: vec![ToolInfo {
            id: SEARCH_TOOL,
            name: "Search",
            description: "Search in Meilisearch",
            args: serde_json::json!({ "query": "Query" }),
            examples: vec!["Search for something", "Search for something else"],
        }],
        tasks: vec![SEARCH_HANDLER_ID],
    }
}

/// Search box descriptor; the UI submits its query to `search_handler_name`.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchDescriptor {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub placeholder: &'static str,
    pub query: String,
    pub search_type: &'static str,
    pub search_handler_name: &'static str,
}

pub fn search_descriptor(query: String) -> SearchDescriptor {
    SearchDescriptor {
        kind: "Search",
        placeholder: "Search Query",
        query,
        search_type: "submit",
        search_handler_name: SEARCH_HANDLER_ID,
    }
}

/// Result card rendered for each search hit.
#[derive(Debug, Serialize, PartialEq)]
pub struct SearchItem {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: String,
    pub body: String,
}

pub fn hit_to_search_item(hit: &Hit) -> SearchItem {
    let field = |name: &str| {
        hit.get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    SearchItem {
        kind: "Post",
        title: field("title"),
        body: field("body"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hit(value: Value) -> Hit {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test hits are objects"),
        }
    }

    #[test]
    fn hit_maps_title_and_body() {
        let item = hit_to_search_item(&hit(json!({
            "id": "1",
            "title": "Borrowing",
            "body": "shared xor mutable"
        })));

        assert_eq!(item.kind, "Post");
        assert_eq!(item.title, "Borrowing");
        assert_eq!(item.body, "shared xor mutable");
    }

    #[test]
    fn missing_or_non_string_fields_become_empty() {
        let item = hit_to_search_item(&hit(json!({ "title": 7 })));

        assert_eq!(item.title, "");
        assert_eq!(item.body, "");
    }

    #[test]
    fn descriptor_points_at_search_handler() {
        let value = serde_json::to_value(search_descriptor("cats".into())).unwrap();

        assert_eq!(
            value,
            json!({
                "type": "Search",
                "placeholder": "Search Query",
                "query": "cats",
                "searchType": "submit",
                "searchHandlerName": "gd-meilisearch.search_handler"
            })
        );
    }

    #[test]
    fn handler_id_is_namespaced() {
        assert!(SEARCH_HANDLER_ID.starts_with(NAMESPACE));
        assert_eq!(manifest().tasks, vec![SEARCH_HANDLER_ID]);
    }
}
