//! Role-specialized steps of the refinement cycle.
//!
//! Each step reads and writes the shared [`crate::core::state::RunState`] and
//! returns; no step calls another. Generate, critic, and refine issue exactly
//! one oracle request each. Deciding is pure and lives in
//! [`crate::core::decide`].

pub mod critic;
pub mod generate;
pub mod refine;

use anyhow::Result;
use minijinja::{Environment, context};

const GENERATE_TEMPLATE: &str = include_str!("prompts/generate.md");
const CRITIC_TEMPLATE: &str = include_str!("prompts/critic.md");
const REFINE_TEMPLATE: &str = include_str!("prompts/refine.md");

/// Template engine wrapper around minijinja.
pub(crate) struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    pub(crate) fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("generate", GENERATE_TEMPLATE)
            .expect("generate template should be valid");
        env.add_template("critic", CRITIC_TEMPLATE)
            .expect("critic template should be valid");
        env.add_template("refine", REFINE_TEMPLATE)
            .expect("refine template should be valid");
        Self { env }
    }

    pub(crate) fn render_generate(&self, task: &str) -> Result<String> {
        let template = self.env.get_template("generate")?;
        let rendered = template.render(context! { task => task.trim() })?;
        Ok(rendered)
    }

    pub(crate) fn render_critic(&self, task: &str, solution: &str) -> Result<String> {
        let template = self.env.get_template("critic")?;
        let rendered = template.render(context! {
            task => task.trim(),
            solution => solution.trim(),
        })?;
        Ok(rendered)
    }

    pub(crate) fn render_refine(
        &self,
        task: &str,
        solution: &str,
        critique_json: &str,
    ) -> Result<String> {
        let template = self.env.get_template("refine")?;
        let rendered = template.render(context! {
            task => task.trim(),
            solution => solution.trim(),
            critique => critique_json,
        })?;
        Ok(rendered)
    }
}
