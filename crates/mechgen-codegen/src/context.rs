//! The emitter.
//!
//! [`Emitter`] walks one mechanism instance (already merged against its
//! template) and produces the full set of output files for it. Rendering is
//! pure: the same robot set always produces the same bytes, and nothing
//! here touches the filesystem — callers persist the returned
//! [`GeneratedFile`]s.

use std::path::PathBuf;

use mechgen_naming::underscore_upper;
use mechgen_template::{RenderContext, Strictness};
use mechgen_types::model::{MechanismInstance, RobotConfig, RobotVariantSet, UnitCatalog};
use mechgen_types::{GenError, GenResult, ProgressLog};

use crate::paths;
use crate::templates::{TemplateKind, TemplateSet};
use crate::{instance, states};

/// One rendered output file, relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub relative_path: PathBuf,
    pub content: String,
    /// Decorator semantics: never overwrite once the file exists.
    pub write_once: bool,
}

/// Renders mechanism instances into output files.
pub struct Emitter<'a> {
    pub set: &'a RobotVariantSet,
    pub templates: &'a TemplateSet,
    pub units: &'a UnitCatalog,
    pub strictness: Strictness,
    pub tool_version: &'a str,
}

impl<'a> Emitter<'a> {
    pub fn new(
        set: &'a RobotVariantSet,
        templates: &'a TemplateSet,
        units: &'a UnitCatalog,
        strictness: Strictness,
        tool_version: &'a str,
    ) -> Self {
        Self {
            set,
            templates,
            units,
            strictness,
            tool_version,
        }
    }

    /// Render every output file for the named mechanism instance.
    ///
    /// The representative instance is the first robot's copy (robots are in
    /// declared order); per-robot differences are reconciled through branch
    /// synthesis, not by picking a different representative.
    pub fn emit_instance(
        &self,
        instance_name: &str,
        log: &mut ProgressLog<'_>,
    ) -> GenResult<Vec<GeneratedFile>> {
        let robots = self.participating_robots(instance_name);
        let representative = robots
            .first()
            .and_then(|r| r.instance(instance_name))
            .ok_or_else(|| {
                GenError::Consistency(format!(
                    "mechanism instance `{instance_name}` not found on any robot"
                ))
            })?;

        let mut files = Vec::new();

        for kind in [TemplateKind::MechanismBody, TemplateKind::MechanismHeader] {
            files.push(self.render_instance_file(kind, representative, log)?);
        }

        for state in &representative.mechanism.states {
            for kind in [
                TemplateKind::StateDecoratorHeader,
                TemplateKind::StateDecoratorBody,
            ] {
                files.push(self.render_state_file(kind, representative, &state.name, log)?);
            }
        }

        Ok(files)
    }

    /// Robots carrying an instance with this name, declared order.
    pub fn participating_robots(&self, instance_name: &str) -> Vec<&'a RobotConfig> {
        self.set.robots_with_instance(instance_name)
    }

    /// The generation notice substituted into every template.
    pub fn gen_notice(&self, write_once: bool) -> String {
        if write_once {
            format!(
                "// Generated by mechgen {} on first run. This file is yours to edit;\n\
                 // it will not be overwritten.",
                self.tool_version
            )
        } else {
            format!(
                "// Generated by mechgen {}. Do not edit; changes are overwritten\n\
                 // on the next generation run.",
                self.tool_version
            )
        }
    }

    /// Base render context shared by every kind.
    pub fn base_context(&self, mi: &MechanismInstance, write_once: bool) -> RenderContext {
        let mut ctx = RenderContext::new().with_strictness(self.strictness);
        ctx.set("GEN_NOTICE", self.gen_notice(write_once));
        ctx.set("MECHANISM_NAME", mi.mechanism.name.clone());
        ctx.set("MECHANISM_INSTANCE_NAME", mi.name.clone());
        ctx.set("MECHANISM_TYPE_NAME", underscore_upper(&mi.name));
        ctx.set("MECHANISM_INSTANCE_NAME_UPPER_CASE", underscore_upper(&mi.name));
        ctx
    }

    fn render_instance_file(
        &self,
        kind: TemplateKind,
        mi: &MechanismInstance,
        log: &mut ProgressLog<'_>,
    ) -> GenResult<GeneratedFile> {
        let file = self.template_file(kind)?;
        let mut ctx = self.base_context(mi, false);
        instance::fill_instance_context(self, mi, &mut ctx, log)?;

        let rendered = file.template.render(&ctx).map_err(GenError::from)?;
        self.report_unresolved(&rendered.unresolved, &mi.name, log);

        let name = paths::resolve_pattern(&file.output_pattern, &mi.name, &mi.mechanism.name, None);
        Ok(GeneratedFile {
            relative_path: paths::mechanism_file(&mi.name, true, &name),
            content: rendered.text,
            write_once: false,
        })
    }

    fn render_state_file(
        &self,
        kind: TemplateKind,
        mi: &MechanismInstance,
        state_name: &str,
        log: &mut ProgressLog<'_>,
    ) -> GenResult<GeneratedFile> {
        let file = self.template_file(kind)?;
        let mut ctx = self.base_context(mi, true);
        states::fill_state_context(self, mi, state_name, &mut ctx, log)?;

        let rendered = file.template.render(&ctx).map_err(GenError::from)?;
        self.report_unresolved(&rendered.unresolved, &mi.name, log);

        let name = paths::resolve_pattern(
            &file.output_pattern,
            &mi.name,
            &mi.mechanism.name,
            Some(state_name),
        );
        Ok(GeneratedFile {
            relative_path: paths::mechanism_file(&mi.name, false, &name),
            content: rendered.text,
            write_once: true,
        })
    }

    fn template_file(&self, kind: TemplateKind) -> GenResult<&crate::templates::TemplateFile> {
        self.templates.get(kind).ok_or_else(|| {
            GenError::Template(format!("no template registered for {kind:?}"))
        })
    }

    fn report_unresolved(&self, unresolved: &[String], instance: &str, log: &mut ProgressLog<'_>) {
        for name in unresolved {
            log.warn(format!(
                "In mechanism {instance}, template placeholder $$_{name}_$$ was not \
                 resolved and was passed through"
            ));
        }
    }
}

/// Robot identifier enum token: `CompBot302` → `COMP_BOT302`.
pub fn robot_identifier_token(robot: &RobotConfig) -> String {
    underscore_upper(&robot.full_name())
}
