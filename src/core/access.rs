use crate::core::models::survey::Survey;
use crate::error::Error;

/// What a request wants to do with a survey. Each variant is a predicate over
/// the survey state and the caller; a failed check is reported as not found so
/// that a stranger cannot tell a foreign survey from a missing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyAccess {
    /// Delete. Creator only, any state.
    Manage,
    /// Results. Creator only, published surveys.
    ViewResults,
    /// Structure changes and activation. Creator only, while authoring.
    Author,
    /// Public start/submit/thanks. Anyone, published surveys.
    Respond,
}

impl SurveyAccess {
    pub fn allows(self, survey: &Survey, caller: Option<i32>) -> bool {
        let is_creator = caller == Some(survey.creator_id);
        match self {
            SurveyAccess::Manage => is_creator,
            SurveyAccess::ViewResults => is_creator && survey.is_active,
            SurveyAccess::Author => is_creator && !survey.is_active,
            SurveyAccess::Respond => survey.is_active,
        }
    }

    pub fn check(self, survey: Option<Survey>, caller: Option<i32>) -> Result<Survey, Error> {
        match survey {
            Some(survey) if self.allows(&survey, caller) => Ok(survey),
            Some(survey) => {
                log::debug!("{:?} access to survey {} denied for caller {:?}", self, survey.id, caller);
                Err(Error::NotFound)
            }
            None => Err(Error::NotFound),
        }
    }
}
