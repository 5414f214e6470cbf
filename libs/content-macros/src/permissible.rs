use heck::ToUpperCamelCase;
use proc_macro_error2::abort;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{Data, DeriveInput, Fields, spanned::Spanned};

/// Field every entity must carry; it selects the record and is never merged.
const ID_FIELD: &str = "id";

/// How one rule (ownership or create-eligibility) is resolved.
enum Rule {
    /// The field holds a user id.
    Field(String, Span),
    /// The field holds the id of a record of `kind`; the rule follows that record.
    Via { kind: String, field: String, span: Span },
    /// The rule never applies.
    Never,
}

/// Configuration parsed from `#[permit(...)]` attributes
#[derive(Default)]
struct PermitConfig {
    kind: Option<(String, Span)>,
    owner: Option<Rule>,
    create: Option<Rule>,
    // Natural keys: (lookup name, key fields, span)
    lookups: Vec<(String, Vec<String>, Span)>,
}

#[allow(clippy::needless_pass_by_value)] // DeriveInput is consumed by proc-macro pattern
pub fn expand_derive_permissible(input: DeriveInput) -> TokenStream {
    let fields = named_fields(&input);
    let config = parse_permit_attrs(&input);
    validate_config(&config, &fields, &input);

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let kind_variant = match &config.kind {
        Some((kind, span)) => syn::Ident::new(&kind_variant(kind), *span),
        None => abort!(input.span(), "permit: missing `kind = \"...\"`"),
    };

    let names: Vec<&String> = fields.iter().map(|(_, name)| name).collect();
    let idents: Vec<&syn::Ident> = fields.iter().map(|(ident, _)| ident).collect();
    let mergeable: Vec<&syn::Ident> = fields
        .iter()
        .filter(|(_, name)| name != ID_FIELD)
        .map(|(ident, _)| ident)
        .collect();

    let owner_body = rule_body(config.owner.as_ref());
    let create_body = rule_body(config.create.as_ref());
    let lookups_const = lookups_const(&config);
    let lookup_key_body = lookup_key_body(&config);

    quote! {
        impl #impl_generics ::content_sdk::Entity for #ident #ty_generics #where_clause {
            const KIND: ::content_sdk::EntityKind = ::content_sdk::EntityKind::#kind_variant;

            const FIELDS: &'static [&'static str] = &[#(#names),*];

            const LOOKUPS: &'static [::content_sdk::Lookup] = #lookups_const;

            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: ::std::string::String) {
                self.id = id;
            }

            fn is_set(&self, field: &str) -> bool {
                match field {
                    #(#names => !::content_sdk::FieldValue::is_zero(&self.#idents),)*
                    _ => false,
                }
            }

            fn clear_field(&mut self, field: &str) {
                match field {
                    #(#names => self.#idents = ::core::default::Default::default(),)*
                    _ => {}
                }
            }

            fn field_text(&self, field: &str) -> ::core::option::Option<::std::string::String> {
                match field {
                    #(#names => ::core::option::Option::Some(::content_sdk::FieldValue::text(&self.#idents)),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn merge(&mut self, patch: &Self) {
                #(
                    if !::content_sdk::FieldValue::is_zero(&patch.#mergeable) {
                        self.#mergeable = ::core::clone::Clone::clone(&patch.#mergeable);
                    }
                )*
            }

            fn owner(&self) -> ::core::option::Option<::content_sdk::OwnerRef> {
                #owner_body
            }

            fn create_parent(&self) -> ::core::option::Option<::content_sdk::OwnerRef> {
                #create_body
            }

            fn lookup_key(&self, lookup: &str) -> ::core::option::Option<::std::vec::Vec<::std::string::String>> {
                #lookup_key_body
            }
        }
    }
}

/// Collect `(ident, name)` for every named field.
fn named_fields(input: &DeriveInput) -> Vec<(syn::Ident, String)> {
    let Data::Struct(data) = &input.data else {
        abort!(
            input.span(),
            "#[derive(Permissible)] can only be applied to structs"
        );
    };
    let Fields::Named(named) = &data.fields else {
        abort!(
            input.span(),
            "#[derive(Permissible)] requires a struct with named fields"
        );
    };

    named
        .named
        .iter()
        .filter_map(|field| field.ident.clone())
        .map(|ident| {
            let name = ident.to_string();
            (ident, name)
        })
        .collect()
}

/// Generate the body of `owner()` / `create_parent()` for one rule.
fn rule_body(rule: Option<&Rule>) -> TokenStream {
    match rule {
        Some(Rule::Field(field, span)) => {
            let ident = syn::Ident::new(field, *span);
            quote! {
                if ::content_sdk::FieldValue::is_zero(&self.#ident) {
                    ::core::option::Option::None
                } else {
                    ::core::option::Option::Some(::content_sdk::OwnerRef::User(
                        ::content_sdk::FieldValue::text(&self.#ident),
                    ))
                }
            }
        }
        Some(Rule::Via { kind, field, span }) => {
            let ident = syn::Ident::new(field, *span);
            let variant = syn::Ident::new(&kind_variant(kind), *span);
            quote! {
                if ::content_sdk::FieldValue::is_zero(&self.#ident) {
                    ::core::option::Option::None
                } else {
                    ::core::option::Option::Some(::content_sdk::OwnerRef::Record {
                        kind: ::content_sdk::EntityKind::#variant,
                        id: ::content_sdk::FieldValue::text(&self.#ident),
                    })
                }
            }
        }
        Some(Rule::Never) | None => quote! { ::core::option::Option::None },
    }
}

fn lookups_const(config: &PermitConfig) -> TokenStream {
    let entries = config.lookups.iter().map(|(name, fields, _)| {
        quote! {
            ::content_sdk::Lookup { name: #name, fields: &[#(#fields),*] }
        }
    });
    quote! { &[#(#entries),*] }
}

fn lookup_key_body(config: &PermitConfig) -> TokenStream {
    let arms = config.lookups.iter().map(|(name, fields, span)| {
        let idents = fields.iter().map(|field| syn::Ident::new(field, *span));
        quote! {
            #name => ::core::option::Option::Some(::std::vec![
                #(::content_sdk::FieldValue::text(&self.#idents)),*
            ]),
        }
    });
    quote! {
        match lookup {
            #(#arms)*
            _ => ::core::option::Option::None,
        }
    }
}

/// Validate the configuration for strict compile-time checks
fn validate_config(config: &PermitConfig, fields: &[(syn::Ident, String)], input: &DeriveInput) {
    let struct_span = input.span();
    let has_field = |name: &str| fields.iter().any(|(_, field)| field == name);

    if !has_field(ID_FIELD) {
        abort!(struct_span, "permit: entity must have an `id` field");
    }
    if config.kind.is_none() {
        abort!(struct_span, "permit: missing `kind = \"...\"`");
    }

    validate_rule(
        config.owner.as_ref(),
        "permit: missing explicit decision for owner:\n  \
         use `owner = \"field\"`, `owner_via(kind = \"field\")` or `no_owner`",
        struct_span,
        &has_field,
    );
    validate_rule(
        config.create.as_ref(),
        "permit: missing explicit decision for create parent:\n  \
         use `create_parent = \"field\"`, `create_via(kind = \"field\")` or `no_create_parent`",
        struct_span,
        &has_field,
    );

    validate_lookups(config, &has_field);
}

fn validate_rule(rule: Option<&Rule>, missing: &str, struct_span: Span, has_field: &dyn Fn(&str) -> bool) {
    match rule {
        None => abort!(struct_span, "{}", missing),
        Some(Rule::Field(field, span) | Rule::Via { field, span, .. }) if !has_field(field) => {
            abort!(*span, "permit: unknown field '{}'", field);
        }
        Some(_) => {}
    }
}

/// Validate lookups for empty names, duplicates, and unknown fields.
fn validate_lookups(config: &PermitConfig, has_field: &dyn Fn(&str) -> bool) {
    let mut seen = std::collections::HashSet::new();

    for (name, fields, span) in &config.lookups {
        if name.is_empty() {
            abort!(*span, "lookup: name must not be empty");
        }
        if fields.is_empty() {
            abort!(*span, "lookup '{}': at least one key field is required", name);
        }
        if let Some(unknown) = fields.iter().find(|field| !has_field(field)) {
            abort!(*span, "lookup '{}': unknown field '{}'", name, unknown);
        }
        if !seen.insert(name.clone()) {
            abort!(*span, "lookup: duplicate lookup name '{}'", name);
        }
    }
}

/// Parse all `#[permit(...)]` attributes with duplicate detection
fn parse_permit_attrs(input: &DeriveInput) -> PermitConfig {
    let mut config = PermitConfig::default();

    for attr in &input.attrs {
        if !attr.path().is_ident("permit") {
            continue;
        }

        let result = attr.parse_nested_meta(|meta| {
            let span = meta.path.span();

            if meta.path.is_ident("no_owner") {
                set_rule(&mut config.owner, Rule::Never, "owner", span);
                return Ok(());
            }

            if meta.path.is_ident("no_create_parent") {
                set_rule(&mut config.create, Rule::Never, "create parent", span);
                return Ok(());
            }

            // owner_via(kind = "field") / create_via(kind = "field")
            if meta.path.is_ident("owner_via") || meta.path.is_ident("create_via") {
                let mut via = None;
                meta.parse_nested_meta(|inner| {
                    let kind = inner
                        .path
                        .get_ident()
                        .map(ToString::to_string)
                        .unwrap_or_default();
                    let field = inner.value()?.parse::<syn::LitStr>()?.value();
                    if via.is_some() {
                        abort!(inner.path.span(), "permit: `*_via` takes exactly one `kind = \"field\"`");
                    }
                    via = Some(Rule::Via { kind, field, span: inner.path.span() });
                    Ok(())
                })?;
                let Some(rule) = via else {
                    abort!(span, "permit: `*_via` requires `kind = \"field\"`");
                };
                if meta.path.is_ident("owner_via") {
                    set_rule(&mut config.owner, rule, "owner", span);
                } else {
                    set_rule(&mut config.create, rule, "create parent", span);
                }
                return Ok(());
            }

            // lookup(name = ["field", ...])
            if meta.path.is_ident("lookup") {
                meta.parse_nested_meta(|inner| {
                    let name = inner
                        .path
                        .get_ident()
                        .map(ToString::to_string)
                        .unwrap_or_default();
                    let array = inner.value()?.parse::<syn::ExprArray>()?;
                    let fields = array.elems.iter().map(string_element).collect();
                    config.lookups.push((name, fields, inner.path.span()));
                    Ok(())
                })?;
                return Ok(());
            }

            parse_key_value_attr(&mut config, meta);
            Ok(())
        });

        if let Err(err) = result {
            abort!(err.span(), "{}", err);
        }
    }

    config
}

fn set_rule(slot: &mut Option<Rule>, rule: Rule, name: &str, span: Span) {
    if slot.is_some() {
        abort!(span, "permit: specify exactly one {} rule", name);
    }
    *slot = Some(rule);
}

fn string_element(expr: &syn::Expr) -> String {
    match expr {
        syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Str(lit),
            ..
        }) => lit.value(),
        other => abort!(other.span(), "lookup: expected string literal field name"),
    }
}

/// Parse a key-value attribute like `owner = "user_id"`.
#[allow(clippy::needless_pass_by_value)] // ParseNestedMeta is consumed by .value()
fn parse_key_value_attr(config: &mut PermitConfig, meta: syn::meta::ParseNestedMeta<'_>) {
    let span = meta.path.span();
    let key = meta
        .path
        .get_ident()
        .map(ToString::to_string)
        .unwrap_or_default();

    if key.is_empty() {
        abort!(span, "Expected attribute name");
    }

    let value: String = match meta.value() {
        Ok(v) => match v.parse::<syn::LitStr>() {
            Ok(lit) => lit.value(),
            Err(_) => abort!(span, "Expected string literal"),
        },
        Err(_) => abort!(span, "Expected '=' followed by a string value"),
    };

    match key.as_str() {
        "kind" => {
            if config.kind.is_some() {
                abort!(span, "duplicate attribute 'kind'");
            }
            config.kind = Some((value, span));
        }
        "owner" => set_rule(&mut config.owner, Rule::Field(value, span), "owner", span),
        "create_parent" => set_rule(
            &mut config.create,
            Rule::Field(value, span),
            "create parent",
            span,
        ),
        _ => {
            abort!(
                span,
                "Unknown attribute '{}'. Valid attributes: kind, owner, owner_via, no_owner, \
                 create_parent, create_via, no_create_parent, lookup",
                key
            );
        }
    }
}

/// Convert a `snake_case` kind name to its `EntityKind` variant name
fn kind_variant(kind: &str) -> String {
    kind.to_upper_camel_case()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn lesson() -> DeriveInput {
        syn::parse_quote! {
            #[permit(
                kind = "course_lesson",
                owner_via(course = "course_id"),
                create_via(course = "course_id"),
                lookup(number = ["course_id", "number"])
            )]
            pub struct CourseLesson {
                pub id: String,
                pub course_id: String,
                pub number: i32,
            }
        }
    }

    #[test]
    fn test_kind_variant() {
        assert_eq!(kind_variant("study"), "Study");
        assert_eq!(kind_variant("course_lesson"), "CourseLesson");
        assert_eq!(kind_variant("user_asset"), "UserAsset");
    }

    #[test]
    fn test_parse_via_rules_and_lookups() {
        let config = parse_permit_attrs(&lesson());

        assert_eq!(config.kind.as_ref().map(|(k, _)| k.as_str()), Some("course_lesson"));
        assert!(matches!(
            config.owner,
            Some(Rule::Via { ref kind, ref field, .. }) if kind == "course" && field == "course_id"
        ));
        assert_eq!(config.lookups.len(), 1);
        assert_eq!(config.lookups[0].0, "number");
        assert_eq!(config.lookups[0].1, vec!["course_id", "number"]);
    }

    #[test]
    fn test_parse_field_and_never_rules() {
        let input: DeriveInput = syn::parse_quote! {
            #[permit(kind = "study", owner = "user_id", no_create_parent)]
            pub struct Study {
                pub id: String,
                pub user_id: String,
            }
        };

        let config = parse_permit_attrs(&input);

        assert!(matches!(config.owner, Some(Rule::Field(ref f, _)) if f == "user_id"));
        assert!(matches!(config.create, Some(Rule::Never)));
        assert!(config.lookups.is_empty());
    }

    #[test]
    fn test_expand_targets_entity_kind_variant() {
        let expanded = expand_derive_permissible(lesson()).to_string();

        assert!(expanded.contains("EntityKind :: CourseLesson"));
        assert!(expanded.contains("EntityKind :: Course ,"));
        assert!(expanded.contains("\"number\""));
    }

    #[test]
    fn test_id_is_not_merged() {
        let expanded = expand_derive_permissible(lesson()).to_string();

        assert!(!expanded.contains("patch . id"));
        assert!(expanded.contains("patch . course_id"));
    }
}
