//! ProjectVariable translator

use crate::reconciler::shared::variable::{VariableKind, VariableTranslator};
use crate::reconciler::shared::{Scope, scoped_kind};
use crds::{ProjectVariable, ProjectVariableParameters, VariableParameters};

scoped_kind!(ProjectVariable, "project variable", Scope::Project, project_id);

impl VariableKind for ProjectVariable {
    fn variable(params: &ProjectVariableParameters) -> &VariableParameters {
        &params.variable
    }

    fn variable_mut(params: &mut ProjectVariableParameters) -> &mut VariableParameters {
        &mut params.variable
    }
}

pub type ProjectVariableTranslator = VariableTranslator<ProjectVariable>;
