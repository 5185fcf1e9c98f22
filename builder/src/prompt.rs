//! Prompt rendering for the generation stages.
//!
//! Templates are embedded at compile time and rendered deterministically;
//! context caps (research excerpts, issue text) are applied by the callers,
//! not here.

use std::sync::LazyLock;

use minijinja::{Environment, context};

const CHAT_TEMPLATE: &str = include_str!("prompts/chat.md");
const RESEARCH_TEMPLATE: &str = include_str!("prompts/research.md");
const PLAN_TEMPLATE: &str = include_str!("prompts/plan.md");
const GENERATE_TEMPLATE: &str = include_str!("prompts/generate.md");
const REVIEW_TEMPLATE: &str = include_str!("prompts/review.md");
const REPAIR_TEMPLATE: &str = include_str!("prompts/repair.md");
const REFINE_TEMPLATE: &str = include_str!("prompts/refine.md");

static ENGINE: LazyLock<Environment<'static>> = LazyLock::new(|| {
    let mut env = Environment::new();
    let templates = [
        ("chat", CHAT_TEMPLATE),
        ("research", RESEARCH_TEMPLATE),
        ("plan", PLAN_TEMPLATE),
        ("generate", GENERATE_TEMPLATE),
        ("review", REVIEW_TEMPLATE),
        ("repair", REPAIR_TEMPLATE),
        ("refine", REFINE_TEMPLATE),
    ];
    for (name, source) in templates {
        env.add_template(name, source)
            .expect("embedded template should be valid");
    }
    env
});

fn render(name: &str, ctx: minijinja::Value) -> String {
    ENGINE
        .get_template(name)
        .expect("template is registered")
        .render(ctx)
        .expect("template rendering should not fail")
}

fn non_empty(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

pub fn chat(request: &str, note: &str) -> String {
    render("chat", context! { request => request.trim(), note => non_empty(note) })
}

pub fn research(idea: &str) -> String {
    render("research", context! { idea => idea.trim() })
}

pub fn plan(idea: &str, research: &str) -> String {
    render(
        "plan",
        context! { idea => idea.trim(), research => non_empty(research) },
    )
}

pub fn generate(idea: &str, plan: &str, research: &str) -> String {
    render(
        "generate",
        context! {
            idea => idea.trim(),
            plan => plan.trim(),
            research => non_empty(research),
        },
    )
}

pub fn review(markup: &str, requirements: &str) -> String {
    render(
        "review",
        context! { markup => markup, requirements => non_empty(requirements) },
    )
}

pub fn repair(markup: &str, issues: &str) -> String {
    render("repair", context! { markup => markup, issues => issues.trim() })
}

pub fn refine(markup: &str, feedback: &str) -> String {
    render("refine", context! { markup => markup, feedback => feedback.trim() })
}
