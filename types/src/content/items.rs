use crate::content::message::MessageItem;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum Item {
    #[serde(rename = "message")]
    Message(MessageItem),
    #[serde(rename = "function_call")]
    FunctionCall(FunctionCallItem),
    #[serde(rename = "function_call_output")]
    FunctionCallOutput(FunctionCallOutputItem),
}

impl Item {
    /// A user message carrying a single `input_text` part.
    pub fn user_text(text: &str) -> Self {
        Item::Message(MessageItem::builder().with_input_text(text).build())
    }

    pub fn function_call_output(call_id: &str, output: &str) -> Self {
        Item::FunctionCallOutput(FunctionCallOutputItem::new(call_id, output))
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Item::Message(item) => item.meta().id.as_deref(),
            Item::FunctionCall(item) => item.meta.id.as_deref(),
            Item::FunctionCallOutput(item) => item.meta.id.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ItemStatus {
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "in_progress")]
    InProgress,
    #[serde(rename = "incomplete")]
    Incomplete,
}

/// Fields shared by every conversation item.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ItemMeta {
    /// The unique ID of the item, optional for client events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The status of the item: "completed", "in_progress", "incomplete"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FunctionCallItem {
    #[serde(flatten)]
    meta: ItemMeta,
    /// The ID of the function call.
    call_id: Option<String>,

    /// The name of the function being called.
    name: Option<String>,

    /// The JSON-encoded arguments of the function call.
    arguments: Option<String>,
}

impl FunctionCallItem {
    pub fn call_id(&self) -> Option<&str> {
        self.call_id.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn arguments(&self) -> Option<&str> {
        self.arguments.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FunctionCallOutputItem {
    #[serde(flatten)]
    meta: ItemMeta,
    /// The ID of the function call this output answers.
    call_id: String,
    /// The output of the function call.
    output: String,
}

impl FunctionCallOutputItem {
    pub fn new(call_id: &str, output: &str) -> Self {
        Self {
            meta: ItemMeta::default(),
            call_id: call_id.to_string(),
            output: output.to_string(),
        }
    }

    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    pub fn output(&self) -> &str {
        &self.output
    }
}
