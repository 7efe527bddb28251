//! Agent registry and selection.
//!
//! The registry holds the fixed set of agents with their trigger keywords and
//! decides, per request, which of them run and in what order.

use std::fmt;
use std::sync::Arc;

use conductor_abstraction::{DocumentExtractor, Model, WebSearch};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::agents::{AnalysisAgent, CalendarAgent, FileAgent, MailAgent, ResearchAgent};
use crate::config::OrchestratorConfig;
use crate::request::Attachment;
use crate::{Agent, AgentKind};

/// Why an agent was selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SelectionReason {
    /// The request carried attachments.
    Attachments,
    /// The query contained this keyword.
    Keyword(String),
    /// Nothing else matched.
    Fallback,
}

impl fmt::Display for SelectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attachments => f.write_str("attachments"),
            Self::Keyword(kw) => write!(f, "keyword:{kw}"),
            Self::Fallback => f.write_str("fallback"),
        }
    }
}

impl From<SelectionReason> for String {
    fn from(reason: SelectionReason) -> Self {
        reason.to_string()
    }
}

impl TryFrom<String> for SelectionReason {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "attachments" => Ok(Self::Attachments),
            "fallback" => Ok(Self::Fallback),
            other => other
                .strip_prefix("keyword:")
                .map(|kw| Self::Keyword(kw.to_string()))
                .ok_or_else(|| format!("unknown selection reason: {other}")),
        }
    }
}

/// One selected agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub agent: AgentKind,
    pub reason: SelectionReason,
}

/// Public description of a registered agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    pub id: AgentKind,
    pub name: String,
    pub description: String,
    pub priority: u8,
    pub keywords: Vec<String>,
    pub enabled: bool,
}

struct RegisteredAgent {
    agent: Arc<dyn Agent>,
    keywords: Vec<String>,
    enabled: bool,
}

/// Registry of the agents available to the orchestrator.
#[derive(Default)]
pub struct AgentRegistry {
    agents: Vec<RegisteredAgent>,
}

impl fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("agents", &self.agents.iter().map(|a| a.agent.kind()).collect::<Vec<_>>())
            .finish()
    }
}

impl AgentRegistry {
    /// Creates a new empty agent registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the registry with all five built-in agents and applies `config`.
    #[must_use]
    pub fn standard(
        model: Arc<dyn Model>,
        search: Arc<dyn WebSearch>,
        extractor: Arc<dyn DocumentExtractor>,
        config: &OrchestratorConfig,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(FileAgent::new(Arc::clone(&extractor))));
        registry.register(Arc::new(ResearchAgent::new(search)));
        registry.register(Arc::new(AnalysisAgent::new(Arc::clone(&model), extractor)));
        registry.register(Arc::new(MailAgent::new(model)));
        registry.register(Arc::new(CalendarAgent::new()));
        registry.configure(config);
        registry
    }

    /// Registers an agent with its built-in keywords.
    ///
    /// An agent of the same kind is replaced in place, keeping registry order.
    /// Returns `true` if the agent was newly registered.
    pub fn register(&mut self, agent: Arc<dyn Agent>) -> bool {
        let kind = agent.kind();
        debug!(agent = %kind, "Registering agent");

        let entry = RegisteredAgent {
            agent,
            keywords: kind.default_keywords().iter().map(ToString::to_string).collect(),
            enabled: true,
        };

        if let Some(existing) = self.agents.iter_mut().find(|a| a.agent.kind() == kind) {
            warn!(agent = %kind, "Agent replaced in registry");
            *existing = entry;
            false
        } else {
            self.agents.push(entry);
            true
        }
    }

    /// Applies keyword overrides and enabled flags from configuration.
    pub fn configure(&mut self, config: &OrchestratorConfig) {
        for id in config.agents.keys() {
            if id.parse::<AgentKind>().is_err() {
                warn!(agent = %id, "Ignoring settings for unknown agent");
            }
        }

        for entry in &mut self.agents {
            let kind = entry.agent.kind();
            let settings = config.agent(kind.id());

            if let Some(keywords) = settings.keywords {
                entry.keywords = keywords.into_iter().map(|k| k.trim().to_lowercase()).filter(|k| !k.is_empty()).collect();
            }

            if !settings.enabled && kind == AgentKind::FALLBACK {
                warn!(agent = %kind, "The fallback agent cannot be disabled");
                entry.enabled = true;
            } else {
                entry.enabled = settings.enabled;
            }
        }
    }

    /// Looks up a registered agent.
    pub fn get(&self, kind: AgentKind) -> Option<Arc<dyn Agent>> {
        self.agents.iter().find(|a| a.agent.kind() == kind).map(|a| Arc::clone(&a.agent))
    }

    /// Selects the agents for a query, ordered by priority.
    ///
    /// Attachments always select the file agent. Other agents are chosen when
    /// one of their keywords occurs in the lowercased query. When nothing
    /// matches, the fallback agent is chosen. Never returns duplicates.
    pub fn select(&self, query: &str, attachments: &[Attachment]) -> Vec<Selection> {
        let query = query.to_lowercase();

        let mut selected: Vec<Selection> = self
            .agents
            .iter()
            .filter(|entry| entry.enabled)
            .filter_map(|entry| {
                let agent = entry.agent.kind();
                let reason = if agent == AgentKind::File && !attachments.is_empty() {
                    Some(SelectionReason::Attachments)
                } else {
                    entry
                        .keywords
                        .iter()
                        .find(|kw| query.contains(kw.as_str()))
                        .map(|kw| SelectionReason::Keyword(kw.clone()))
                };
                reason.map(|reason| Selection { agent, reason })
            })
            .collect();

        if selected.is_empty() && self.get(AgentKind::FALLBACK).is_some() {
            selected.push(Selection { agent: AgentKind::FALLBACK, reason: SelectionReason::Fallback });
        }

        // Stable: equal priorities keep registry order.
        selected.sort_by_key(|s| s.agent.priority());

        debug!(
            agents = ?selected.iter().map(|s| s.agent).collect::<Vec<_>>(),
            "Selected agents"
        );
        selected
    }

    /// Describes every registered agent.
    pub fn describe(&self) -> Vec<AgentDescriptor> {
        self.agents
            .iter()
            .map(|entry| {
                let kind = entry.agent.kind();
                AgentDescriptor {
                    id: kind,
                    name: kind.display_name().to_string(),
                    description: entry.agent.description().to_string(),
                    priority: kind.priority(),
                    keywords: entry.keywords.clone(),
                    enabled: entry.enabled,
                }
            })
            .collect()
    }

    /// Returns the number of registered agents.
    pub fn count(&self) -> usize {
        self.agents.len()
    }
}
