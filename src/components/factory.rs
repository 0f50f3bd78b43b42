// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::components::{Collected, Generator, Sink, Transformer};
use crate::config::BuiltinComponent;
use crate::traits::Component;

/// A freshly built behaviour, plus the collection handle when it is a sink.
pub struct CreatedComponent {
    pub behaviour: Box<dyn Component>,
    pub collected: Option<Collected>,
}

/// Factory for the built-in component kinds
pub struct ComponentFactory;

impl ComponentFactory {
    /// Create a behaviour from its pipeline definition
    ///
    /// The `kind` key of the definition selects the behaviour:
    /// - "generator" -> Generator
    /// - "transformer" -> Transformer
    /// - "sink" -> Sink (its `Collected` handle is returned alongside)
    pub fn create_component(definition: &BuiltinComponent) -> CreatedComponent {
        match definition {
            BuiltinComponent::Generator(config) => CreatedComponent {
                behaviour: Box::new(Generator::new(config.clone())),
                collected: None,
            },
            BuiltinComponent::Transformer(config) => CreatedComponent {
                behaviour: Box::new(Transformer::new(config.clone())),
                collected: None,
            },
            BuiltinComponent::Sink(config) => {
                let sink = Sink::new(config.clone());
                let collected = sink.collected();
                CreatedComponent {
                    behaviour: Box::new(sink),
                    collected: Some(collected),
                }
            }
        }
    }

    /// List all built-in component kinds
    pub fn list_available_kinds() -> Vec<&'static str> {
        vec!["generator", "transformer", "sink"]
    }

    pub fn is_kind_available(kind: &str) -> bool {
        Self::list_available_kinds().contains(&kind)
    }
}
