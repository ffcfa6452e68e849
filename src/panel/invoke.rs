use crate::handler::{Functions, ServerlessContext};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvokeStatus {
    Success,
    Error,
}

/// What the host hands back after running a serverless function
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvokeResult {
    pub status: InvokeStatus,
    pub response: Value,
}

/// Runs a serverless function by name on behalf of a panel
#[async_trait]
pub trait ServerlessInvoker: Send + Sync {
    async fn invoke(&self, name: &str, context: &ServerlessContext) -> Result<InvokeResult>;
}

/// Invoker that runs the functions in-process
pub struct LocalInvoker<'a> {
    functions: Functions<'a>,
}

impl<'a> LocalInvoker<'a> {
    pub fn new(functions: Functions<'a>) -> Self {
        Self { functions }
    }
}

#[async_trait]
impl ServerlessInvoker for LocalInvoker<'_> {
    async fn invoke(&self, name: &str, context: &ServerlessContext) -> Result<InvokeResult> {
        Ok(match self.functions.call(name, context).await {
            Some(response) => InvokeResult {
                status: InvokeStatus::Success,
                response,
            },
            None => InvokeResult {
                status: InvokeStatus::Error,
                response: json!({ "message": format!("Unknown function: {}", name) }),
            },
        })
    }
}
