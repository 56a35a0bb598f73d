//! Server-rendered pages. Rendering is deliberately plain: each view builds
//! its markup with `format!` and hands back `Html<String>`, keeping the
//! template surface a single seam the handlers call into.

use axum::response::Html;
use terraviva::domain::{Language, Owner, Property, Prospect};

fn escape(input: &str) -> String {
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

fn page(title: &str, nav: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{} — Terraviva</title></head>\n\
         <body>\n<nav>{}</nav>\n<main>\n{}\n</main>\n</body>\n</html>\n",
        escape(title),
        nav,
        body
    ))
}

fn public_nav(language: Language) -> String {
    let toggle = match language {
        Language::Espanol => "<a href=\"/set_language/ingles\">English</a>",
        Language::Ingles => "<a href=\"/set_language/espanol\">Español</a>",
    };
    format!("<a href=\"/propiedades\">Terraviva</a> | {toggle}")
}

const CRM_NAV: &str = "<a href=\"/crm/dashboard\">Panel</a> | \
     <a href=\"/crm/propietarios\">Propietarios</a> | \
     <a href=\"/crm/propiedades\">Propiedades</a> | \
     <a href=\"/prospectos\">Prospectos</a> | \
     <a href=\"/crm/logout\">Salir</a>";

fn property_card(property: &Property, language: Language) -> String {
    let mut card = format!(
        "<article><h2><a href=\"/propiedad/{}\">{}</a></h2>",
        property.id,
        escape(property.title(language))
    );
    if !property.price.is_empty() {
        card.push_str(&format!("<p>{}</p>", escape(&property.price)));
    }
    if !property.location.is_empty() {
        card.push_str(&format!("<p>{}</p>", escape(&property.location)));
    }
    if let Some(first_image) = property.images.first() {
        card.push_str(&format!(
            "<img src=\"/static/{}\" alt=\"{}\">",
            escape(first_image),
            escape(property.title(language))
        ));
    }
    card.push_str("</article>");
    card
}

pub(crate) fn property_list(properties: &[Property], language: Language) -> Html<String> {
    let (title, empty) = match language {
        Language::Espanol => ("Propiedades disponibles", "No hay propiedades publicadas."),
        Language::Ingles => ("Available properties", "No properties listed yet."),
    };

    let mut body = format!("<h1>{title}</h1>");
    if properties.is_empty() {
        body.push_str(&format!("<p>{empty}</p>"));
    }
    for property in properties {
        body.push_str(&property_card(property, language));
    }
    page(title, &public_nav(language), &body)
}

pub(crate) fn property_landing(property: &Property, language: Language) -> Html<String> {
    let contact_label = match language {
        Language::Espanol => "Me interesa",
        Language::Ingles => "I'm interested",
    };

    let mut body = format!(
        "<h1>{}</h1>\n<p>{}</p>",
        escape(property.title(language)),
        escape(property.description(language))
    );
    if !property.price.is_empty() {
        body.push_str(&format!("<p><strong>{}</strong></p>", escape(&property.price)));
    }
    if !property.location.is_empty() {
        body.push_str(&format!("<p>{}</p>", escape(&property.location)));
    }
    for image in &property.images {
        body.push_str(&format!("<img src=\"/static/{}\" alt=\"\">", escape(image)));
    }
    body.push_str(&format!(
        "<p><a href=\"/prospecto?propiedad_id={}&amp;phone={}\">{}</a></p>",
        property.id,
        escape(&property.contact_phone),
        contact_label
    ));
    page(property.title(language), &public_nav(language), &body)
}

pub(crate) fn prospect_form(
    language: Language,
    phone: &str,
    source: &str,
    property_id: Option<i64>,
) -> Html<String> {
    let (title, name_label, phone_label, email_label, submit) = match language {
        Language::Espanol => (
            "Déjanos tus datos",
            "Nombre",
            "Teléfono",
            "Correo electrónico",
            "Enviar",
        ),
        Language::Ingles => ("Leave us your details", "Name", "Phone", "E-mail", "Send"),
    };

    let property_field = property_id
        .map(|id| format!("<input type=\"hidden\" name=\"propiedad_id\" value=\"{id}\">"))
        .unwrap_or_default();

    let body = format!(
        "<h1>{title}</h1>\n\
         <form method=\"post\" action=\"/prospecto\">\n\
         <label>{name_label} <input name=\"nombre\" required></label>\n\
         <label>{phone_label} <input name=\"telefono\" value=\"{}\" required></label>\n\
         <label>{email_label} <input name=\"email\" type=\"email\"></label>\n\
         <input type=\"hidden\" name=\"fuente\" value=\"{}\">\n\
         {property_field}\n\
         <button type=\"submit\">{submit}</button>\n\
         </form>",
        escape(phone),
        escape(source),
    );
    page(title, &public_nav(language), &body)
}

pub(crate) fn thank_you(language: Language) -> Html<String> {
    let (title, message) = match language {
        Language::Espanol => (
            "Gracias",
            "Hemos recibido tus datos. Te contactaremos pronto.",
        ),
        Language::Ingles => (
            "Thank you",
            "We received your details and will reach out shortly.",
        ),
    };
    let body = format!("<h1>{title}</h1>\n<p>{message}</p>");
    page(title, &public_nav(language), &body)
}

pub(crate) fn login(error: bool) -> Html<String> {
    let banner = if error {
        "<p class=\"error\">Usuario o contraseña incorrectos</p>"
    } else {
        ""
    };
    let body = format!(
        "<h1>Acceso CRM</h1>\n{banner}\n\
         <form method=\"post\" action=\"/crm/login\">\n\
         <label>Usuario <input name=\"username\"></label>\n\
         <label>Contraseña <input name=\"password\" type=\"password\"></label>\n\
         <button type=\"submit\">Entrar</button>\n\
         </form>"
    );
    page("Acceso CRM", "<a href=\"/propiedades\">Terraviva</a>", &body)
}

pub(crate) fn dashboard(display_name: &str, owners: &[Owner]) -> Html<String> {
    let mut body = format!(
        "<h1>Panel de control</h1>\n<p>Sesión: {}</p>\n<h2>Propietarios ({})</h2>\n<ul>",
        escape(display_name),
        owners.len()
    );
    for owner in owners {
        body.push_str(&format!(
            "<li><a href=\"/crm/propietarios/{}\">{}</a></li>",
            owner.id,
            escape(&owner.name)
        ));
    }
    body.push_str("</ul>");
    page("Panel de control", CRM_NAV, &body)
}

pub(crate) fn owners_page(
    owners: &[Owner],
    properties: &[Property],
    warn_no_owners: bool,
) -> Html<String> {
    let mut body = String::from("<h1>Propietarios</h1>");
    if warn_no_owners {
        body.push_str(
            "<p class=\"warning\">Debes registrar al menos un propietario antes de agregar \
             propiedades.</p>",
        );
    }
    body.push_str("<p><a href=\"/crm/propietarios/nuevo\">Agregar propietario</a></p>\n<table>");
    body.push_str("<tr><th>Nombre</th><th>Email</th><th>Teléfono</th><th>Propiedades</th><th></th></tr>");
    for owner in owners {
        let owned = properties
            .iter()
            .filter(|p| p.owner_id == Some(owner.id))
            .count();
        body.push_str(&format!(
            "<tr><td><a href=\"/crm/propietarios/{id}\">{name}</a></td><td>{email}</td>\
             <td>{phone}</td><td>{owned}</td>\
             <td><a href=\"/crm/propietarios/editar/{id}\">Editar</a> \
             <a href=\"/crm/propietarios/eliminar/{id}\">Eliminar</a></td></tr>",
            id = owner.id,
            name = escape(&owner.name),
            email = escape(&owner.email),
            phone = escape(&owner.phone),
        ));
    }
    body.push_str("</table>");
    page("Propietarios", CRM_NAV, &body)
}

fn owner_fields(owner: Option<&Owner>) -> String {
    let (name, email, phone) = match owner {
        Some(owner) => (
            escape(&owner.name),
            escape(&owner.email),
            escape(&owner.phone),
        ),
        None => (String::new(), String::new(), String::new()),
    };
    format!(
        "<label>Nombre <input name=\"nombre\" value=\"{name}\" required></label>\n\
         <label>Email <input name=\"email\" value=\"{email}\"></label>\n\
         <label>Teléfono <input name=\"telefono\" value=\"{phone}\"></label>"
    )
}

pub(crate) fn owner_form(owner: Option<&Owner>) -> Html<String> {
    let (title, action) = match owner {
        Some(owner) => (
            "Editar propietario",
            format!("/crm/propietarios/editar/{}", owner.id),
        ),
        None => ("Nuevo propietario", "/crm/propietarios/nuevo".to_string()),
    };
    let body = format!(
        "<h1>{title}</h1>\n<form method=\"post\" action=\"{action}\">\n{}\n\
         <button type=\"submit\">Guardar</button>\n</form>",
        owner_fields(owner)
    );
    page(title, CRM_NAV, &body)
}

pub(crate) fn owner_detail(owner: &Owner, properties: &[Property]) -> Html<String> {
    let mut body = format!(
        "<h1>{}</h1>\n<p>{} · {}</p>\n<p>Registrado: {}</p>\n<h2>Propiedades</h2>\n<ul>",
        escape(&owner.name),
        escape(&owner.email),
        escape(&owner.phone),
        escape(&owner.registered_at),
    );
    for property in properties {
        body.push_str(&format!(
            "<li><a href=\"/crm/propiedades/editar/{}\">{}</a> — {}</li>",
            property.id,
            escape(&property.title_es),
            escape(&property.status)
        ));
    }
    body.push_str("</ul>");
    page(&owner.name, CRM_NAV, &body)
}

pub(crate) fn properties_page(owners: &[Owner], properties: &[Property]) -> Html<String> {
    let mut body = String::from("<h1>Propiedades</h1>");
    if owners.is_empty() {
        body.push_str("<p>Registra un propietario para poder crear propiedades.</p>");
    } else {
        body.push_str("<p><a href=\"/crm/propiedades/nueva\">Agregar propiedad</a></p>");
    }
    body.push_str("<table><tr><th>Título</th><th>Propietario</th><th>Estado</th><th>Fotos</th><th></th></tr>");
    for property in properties {
        body.push_str(&format!(
            "<tr><td>{title}</td><td>{owner}</td><td>{status}</td><td>{photos}</td>\
             <td><a href=\"/crm/propiedades/editar/{id}\">Editar</a> \
             <a href=\"/crm/propiedades/eliminar/{id}\">Eliminar</a></td></tr>",
            id = property.id,
            title = escape(&property.title_es),
            owner = escape(property.owner_name.as_deref().unwrap_or("—")),
            status = escape(&property.status),
            photos = property.images.len(),
        ));
    }
    body.push_str("</table>");
    page("Propiedades", CRM_NAV, &body)
}

fn owner_options(owners: &[Owner], selected: Option<i64>) -> String {
    let mut options = String::new();
    for owner in owners {
        let marker = if selected == Some(owner.id) {
            " selected"
        } else {
            ""
        };
        options.push_str(&format!(
            "<option value=\"{}\"{marker}>{}</option>",
            owner.id,
            escape(&owner.name)
        ));
    }
    options
}

pub(crate) fn property_form(owners: &[Owner], property: Option<&Property>) -> Html<String> {
    let (title, action) = match property {
        Some(property) => (
            "Editar propiedad",
            format!("/crm/propiedades/editar/{}", property.id),
        ),
        None => ("Nueva propiedad", "/crm/propiedades/nueva".to_string()),
    };

    let field = |pick: fn(&Property) -> &str| -> String {
        property.map(|p| escape(pick(p))).unwrap_or_default()
    };
    let images = property.map(|p| p.images.join(",")).unwrap_or_default();

    let body = format!(
        "<h1>{title}</h1>\n<form method=\"post\" action=\"{action}\">\n\
         <label>Propietario <select name=\"propietario_id\">{options}</select></label>\n\
         <label>Título (ES) <input name=\"titulo_es\" value=\"{titulo_es}\" required></label>\n\
         <label>Descripción (ES) <textarea name=\"descripcion_es\">{descripcion_es}</textarea></label>\n\
         <label>Título (EN) <input name=\"titulo_en\" value=\"{titulo_en}\" required></label>\n\
         <label>Descripción (EN) <textarea name=\"descripcion_en\">{descripcion_en}</textarea></label>\n\
         <label>Precio <input name=\"precio\" value=\"{precio}\"></label>\n\
         <label>Ubicación <input name=\"ubicacion\" value=\"{ubicacion}\"></label>\n\
         <label>Tipo <input name=\"tipo\" value=\"{tipo}\"></label>\n\
         <label>Estado <input name=\"estado\" value=\"{estado}\"></label>\n\
         <label>Teléfono de contacto <input name=\"telefono_contacto\" value=\"{telefono}\"></label>\n\
         <input type=\"hidden\" name=\"imagenes\" value=\"{images}\">\n\
         <button type=\"submit\">Guardar</button>\n</form>",
        options = owner_options(owners, property.and_then(|p| p.owner_id)),
        titulo_es = field(|p| &p.title_es),
        descripcion_es = field(|p| &p.description_es),
        titulo_en = field(|p| &p.title_en),
        descripcion_en = field(|p| &p.description_en),
        precio = field(|p| &p.price),
        ubicacion = field(|p| &p.location),
        tipo = field(|p| &p.kind),
        estado = field(|p| &p.status),
        telefono = field(|p| &p.contact_phone),
        images = escape(&images),
    );
    page(title, CRM_NAV, &body)
}

pub(crate) fn prospects_page(prospects: &[Prospect]) -> Html<String> {
    let mut body = format!("<h1>Prospectos ({})</h1>\n<table>", prospects.len());
    body.push_str(
        "<tr><th>Fecha</th><th>Nombre</th><th>Teléfono</th><th>Email</th>\
         <th>Fuente</th><th>Propiedad</th><th>Idioma</th></tr>",
    );
    for prospect in prospects {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&prospect.submitted_at),
            escape(&prospect.name),
            escape(&prospect.phone),
            escape(&prospect.email),
            escape(&prospect.source),
            escape(&prospect.property_label),
            escape(&prospect.language),
        ));
    }
    body.push_str("</table>");
    page("Prospectos", CRM_NAV, &body)
}
