//! Plain-HTML page builders. Handlers decide what data flows here; these
//! functions only assemble markup. All user-supplied text goes through
//! [`escape`].

use axum::response::Html;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::snippets::forms::SnippetForm;
use crate::snippets::repo::Snippet;
use crate::users::forms::{ChangePasswordForm, LoginForm, SignupForm};
use crate::users::repo::User;
use crate::validation::Validator;

/// Session-derived state shared by every rendered page.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub flash: Option<String>,
    pub is_authenticated: bool,
    pub csrf_token: String,
}

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn human_date(dt: &OffsetDateTime) -> String {
    let fmt = format_description!("[day] [month repr:short] [year] at [hour]:[minute]");
    dt.format(&fmt).unwrap_or_default()
}

fn field_error(v: &Validator, field: &str) -> String {
    match v.field_error(field) {
        Some(msg) => format!("<label class=\"error\">{}</label>", escape(msg)),
        None => String::new(),
    }
}

fn non_field_errors(v: &Validator) -> String {
    v.non_field_errors
        .iter()
        .map(|msg| format!("<div class=\"error\">{}</div>", escape(msg)))
        .collect()
}

fn layout(ctx: &PageContext, title: &str, main: &str) -> Html<String> {
    let flash = match &ctx.flash {
        Some(msg) => format!("<div class=\"flash\">{}</div>", escape(msg)),
        None => String::new(),
    };

    let nav_right = if ctx.is_authenticated {
        format!(
            concat!(
                "<a href=\"/snippet/create\">Create snippet</a>",
                "<a href=\"/account/view\">Account</a>",
                "<form action=\"/user/logout\" method=\"POST\">",
                "<input type=\"hidden\" name=\"csrf_token\" value=\"{token}\">",
                "<button>Logout</button>",
                "</form>",
            ),
            token = escape(&ctx.csrf_token)
        )
    } else {
        concat!(
            "<a href=\"/user/signup\">Signup</a>",
            "<a href=\"/user/login\">Login</a>",
        )
        .to_string()
    };

    let page = format!(
        concat!(
            "<!doctype html>\n",
            "<html lang=\"en\">\n",
            "<head><meta charset=\"utf-8\"><title>{title} - CipherBin</title></head>\n",
            "<body>\n",
            "<header><h1><a href=\"/\">CipherBin</a></h1></header>\n",
            "<nav><a href=\"/\">Home</a><a href=\"/about\">About</a>{nav_right}</nav>\n",
            "{flash}\n",
            "<main>\n{main}\n</main>\n",
            "</body>\n",
            "</html>\n",
        ),
        title = escape(title),
        nav_right = nav_right,
        flash = flash,
        main = main,
    );
    Html(page)
}

pub fn home_page(ctx: &PageContext, snippets: &[Snippet]) -> Html<String> {
    let main = if snippets.is_empty() {
        "<p>There's nothing to see here... yet!</p>".to_string()
    } else {
        let rows: String = snippets
            .iter()
            .map(|s| {
                format!(
                    "<tr><td><a href=\"/snippet/view/{id}\">{title}</a></td>\
                     <td>{created}</td><td>#{id}</td></tr>",
                    id = s.id,
                    title = escape(&s.title),
                    created = human_date(&s.created),
                )
            })
            .collect();
        format!(
            "<h2>Latest Snippets</h2>\
             <table><tr><th>Title</th><th>Created</th><th>ID</th></tr>{rows}</table>"
        )
    };
    layout(ctx, "Home", &main)
}

pub fn snippet_page(ctx: &PageContext, snippet: &Snippet) -> Html<String> {
    let main = format!(
        "<div class=\"snippet\">\
         <div class=\"metadata\"><strong>{title}</strong><span>#{id}</span></div>\
         <pre><code>{content}</code></pre>\
         <div class=\"metadata\">\
         <time>By {author}, created {created}</time>\
         <time>Expires {expires}</time>\
         </div></div>",
        title = escape(&snippet.title),
        id = snippet.id,
        content = escape(&snippet.content),
        author = escape(&snippet.author_name),
        created = human_date(&snippet.created),
        expires = human_date(&snippet.expires),
    );
    layout(ctx, &snippet.title, &main)
}

pub fn snippet_form_page(ctx: &PageContext, form: &SnippetForm) -> Html<String> {
    let expires_options: String = [(365, "One Year"), (7, "One Week"), (1, "One Day")]
        .iter()
        .map(|(days, label)| {
            let checked = if form.expires == *days { " checked" } else { "" };
            format!(
                "<label><input type=\"radio\" name=\"expires\" value=\"{days}\"{checked}> \
                 {label}</label>"
            )
        })
        .collect();

    let main = format!(
        "<form action=\"/snippet/create\" method=\"POST\">\
         <input type=\"hidden\" name=\"csrf_token\" value=\"{token}\">\
         <div><label>Title:</label>{title_err}\
         <input type=\"text\" name=\"title\" value=\"{title}\"></div>\
         <div><label>Content:</label>{content_err}\
         <textarea name=\"content\">{content}</textarea></div>\
         <div><label>Delete in:</label>{expires_err}{expires_options}</div>\
         <div><input type=\"submit\" value=\"Publish snippet\"></div>\
         </form>",
        token = escape(&ctx.csrf_token),
        title_err = field_error(&form.validator, "title"),
        title = escape(&form.title),
        content_err = field_error(&form.validator, "content"),
        content = escape(&form.content),
        expires_err = field_error(&form.validator, "expires"),
        expires_options = expires_options,
    );
    layout(ctx, "Create a New Snippet", &main)
}

pub fn signup_page(ctx: &PageContext, form: &SignupForm) -> Html<String> {
    let main = format!(
        "<form action=\"/user/signup\" method=\"POST\" novalidate>\
         <input type=\"hidden\" name=\"csrf_token\" value=\"{token}\">\
         <div><label>Name:</label>{name_err}\
         <input type=\"text\" name=\"name\" value=\"{name}\"></div>\
         <div><label>Email:</label>{email_err}\
         <input type=\"email\" name=\"email\" value=\"{email}\"></div>\
         <div><label>Password:</label>{password_err}\
         <input type=\"password\" name=\"password\"></div>\
         <div><input type=\"submit\" value=\"Signup\"></div>\
         </form>",
        token = escape(&ctx.csrf_token),
        name_err = field_error(&form.validator, "name"),
        name = escape(&form.name),
        email_err = field_error(&form.validator, "email"),
        email = escape(&form.email),
        password_err = field_error(&form.validator, "password"),
    );
    layout(ctx, "Signup", &main)
}

pub fn login_page(ctx: &PageContext, form: &LoginForm) -> Html<String> {
    let main = format!(
        "<form action=\"/user/login\" method=\"POST\" novalidate>\
         <input type=\"hidden\" name=\"csrf_token\" value=\"{token}\">\
         {non_field_errors}\
         <div><label>Email:</label>{email_err}\
         <input type=\"email\" name=\"email\" value=\"{email}\"></div>\
         <div><label>Password:</label>{password_err}\
         <input type=\"password\" name=\"password\"></div>\
         <div><input type=\"submit\" value=\"Login\"></div>\
         </form>",
        token = escape(&ctx.csrf_token),
        non_field_errors = non_field_errors(&form.validator),
        email_err = field_error(&form.validator, "email"),
        email = escape(&form.email),
        password_err = field_error(&form.validator, "password"),
    );
    layout(ctx, "Login", &main)
}

pub fn account_page(ctx: &PageContext, user: &User) -> Html<String> {
    let main = format!(
        "<h2>Your Account</h2>\
         <table>\
         <tr><th>Name</th><td>{name}</td></tr>\
         <tr><th>Email</th><td>{email}</td></tr>\
         <tr><th>Joined</th><td>{joined}</td></tr>\
         </table>\
         <p><a href=\"/account/password/update\">Change password</a></p>",
        name = escape(&user.name),
        email = escape(&user.email),
        joined = human_date(&user.created),
    );
    layout(ctx, "Account", &main)
}

pub fn password_page(ctx: &PageContext, form: &ChangePasswordForm) -> Html<String> {
    let main = format!(
        "<form action=\"/account/password/update\" method=\"POST\" novalidate>\
         <input type=\"hidden\" name=\"csrf_token\" value=\"{token}\">\
         <div><label>Current password:</label>{current_err}\
         <input type=\"password\" name=\"currentPassword\"></div>\
         <div><label>New password:</label>{new_err}\
         <input type=\"password\" name=\"newPassword\"></div>\
         <div><label>Confirm new password:</label>{confirm_err}\
         <input type=\"password\" name=\"newPasswordConfirmation\"></div>\
         <div><input type=\"submit\" value=\"Change password\"></div>\
         </form>",
        token = escape(&ctx.csrf_token),
        current_err = field_error(&form.validator, "currentPassword"),
        new_err = field_error(&form.validator, "newPassword"),
        confirm_err = field_error(&form.validator, "newPasswordConfirmation"),
    );
    layout(ctx, "Change Password", &main)
}

pub fn about_page(ctx: &PageContext) -> Html<String> {
    let main = "<h2>About</h2>\
                <p>CipherBin provides a clean, minimal interface for creating, viewing, \
                and managing code snippets with automatic expiration. It features user \
                authentication, session management, and a responsive design suitable for \
                developers who need a quick way to share code samples.</p>";
    layout(ctx, "About", main)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn ctx() -> PageContext {
        PageContext {
            flash: Some("hello".into()),
            is_authenticated: false,
            csrf_token: "tok123".into(),
        }
    }

    fn snippet(title: &str, content: &str) -> Snippet {
        let now = OffsetDateTime::now_utc();
        Snippet {
            id: 1,
            title: title.into(),
            content: content.into(),
            created: now,
            expires: now + Duration::days(7),
            author_name: "Alice".into(),
        }
    }

    #[test]
    fn escape_covers_html_metacharacters() {
        assert_eq!(
            escape(r#"<script>"x" & 'y'</script>"#),
            "&lt;script&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/script&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn snippet_page_escapes_user_content() {
        let html = snippet_page(&ctx(), &snippet("<b>t</b>", "1 < 2")).0;
        assert!(html.contains("&lt;b&gt;t&lt;/b&gt;"));
        assert!(html.contains("1 &lt; 2"));
        assert!(!html.contains("<b>t</b>"));
    }

    #[test]
    fn form_rerender_preserves_values_and_errors() {
        let mut form = SnippetForm {
            title: "my title".into(),
            ..SnippetForm::default()
        };
        form.validator
            .add_field_error("content", "This field cannot be blank");
        let html = snippet_form_page(&ctx(), &form).0;
        assert!(html.contains("value=\"my title\""));
        assert!(html.contains("This field cannot be blank"));
        assert!(html.contains("value=\"365\" checked"));
    }

    #[test]
    fn signup_page_never_echoes_password() {
        let form = SignupForm {
            name: "Bob".into(),
            email: "bob@example.com".into(),
            password: "secret-password".into(),
            ..SignupForm::default()
        };
        let html = signup_page(&ctx(), &form).0;
        assert!(html.contains("value=\"Bob\""));
        assert!(html.contains("value=\"bob@example.com\""));
        assert!(!html.contains("secret-password"));
    }

    #[test]
    fn layout_shows_flash_and_csrf_state() {
        let html = home_page(&ctx(), &[]).0;
        assert!(html.contains("class=\"flash\">hello"));
        assert!(html.contains("Login"));
        assert!(!html.contains("Logout"));

        let authed = PageContext {
            flash: None,
            is_authenticated: true,
            csrf_token: "tok123".into(),
        };
        let html = home_page(&authed, &[]).0;
        assert!(html.contains("Logout"));
        assert!(html.contains("name=\"csrf_token\" value=\"tok123\""));
    }
}
