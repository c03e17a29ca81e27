//! GroupVariable translator

use crate::reconciler::shared::variable::{VariableKind, VariableTranslator};
use crate::reconciler::shared::{Scope, scoped_kind};
use crds::{GroupVariable, GroupVariableParameters, VariableParameters};

scoped_kind!(GroupVariable, "group variable", Scope::Group, group_id);

impl VariableKind for GroupVariable {
    fn variable(params: &GroupVariableParameters) -> &VariableParameters {
        &params.variable
    }

    fn variable_mut(params: &mut GroupVariableParameters) -> &mut VariableParameters {
        &mut params.variable
    }
}

pub type GroupVariableTranslator = VariableTranslator<GroupVariable>;
