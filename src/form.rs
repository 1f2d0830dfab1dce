use {
    std::mem,
    rocket::http::uri,
    crate::prelude::*,
};

fn render_errors(errors: Vec<&form::Error<'_>>) -> RawHtml<String> {
    html! {
        @for error in errors {
            p(class = "error") : error.to_string();
        }
    }
}

/// Wraps a form field, rendering the errors that belong to it and removing them from `errors`.
pub(crate) fn form_field<'v>(name: &str, errors: &mut Vec<&'v form::Error<'v>>, content: impl ToHtml) -> RawHtml<String> {
    let field_errors;
    (field_errors, *errors) = mem::take(errors).into_iter().partition(|error| error.is_for(name));
    html! {
        fieldset(class? = (!field_errors.is_empty()).then_some("error")) {
            : render_errors(field_errors);
            : content;
        }
    }
}

/// A form posting to `uri`. Any `errors` not claimed by a `form_field` are shown above the submit button.
pub(crate) fn full_form(uri: uri::Origin<'_>, csrf: Option<&CsrfToken>, content: impl ToHtml, errors: Vec<&form::Error<'_>>, submit_text: &str) -> RawHtml<String> {
    html! {
        form(action = uri.to_string(), method = "post") {
            : csrf;
            : content;
            fieldset {
                : render_errors(errors);
                input(type = "submit", value = submit_text);
            }
        }
    }
}

/// A form consisting only of a submit button. Returns the rendered errors and the form separately
/// so callers can place the button inline.
pub(crate) fn button_form(uri: uri::Origin<'_>, csrf: Option<&CsrfToken>, errors: Vec<&form::Error<'_>>, submit_text: &str) -> (RawHtml<String>, RawHtml<String>) {
    let errors = render_errors(errors);
    let button = html! {
        form(action = uri.to_string(), method = "post") {
            : csrf;
            input(type = "submit", value = submit_text);
        }
    };
    (errors, button)
}

/// The submitted value, unless parsing the form or verifying its CSRF token reported an error.
pub(crate) fn accepted<'a, T>(value: &'a Option<T>, ctx: &Context<'_>) -> Option<&'a T> {
    value.as_ref().filter(|_| ctx.errors().next().is_none())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_value_without_errors() {
        let ctx = Context::default();
        assert_eq!(accepted(&Some("teamA 01/04 1"), &ctx), Some(&"teamA 01/04 1"));
        assert_eq!(accepted(&None::<&str>, &ctx), None);
    }

    #[test]
    fn rejects_value_after_csrf_error() {
        let mut ctx = Context::default();
        ctx.push_error(form::Error::validation("CSRF token mismatch"));
        assert_eq!(accepted(&Some("teamA 01/04 1"), &ctx), None);
    }

    #[test]
    fn rejects_value_after_field_error() {
        let mut ctx = Context::default();
        ctx.push_error(form::Error::validation("Please fill in the teams.").with_name("teams"));
        assert_eq!(accepted(&Some(()), &ctx), None);
    }
}
