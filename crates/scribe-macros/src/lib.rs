//! Proc-macros for the scribe configuration system.
//!
//! Provides the `Configurable` derive, which generates `KEY=VALUE` override
//! handling and field-wise merging for configuration structs.

use proc_macro::TokenStream;
use quote::{ToTokens, quote};
use syn::{Attribute, Data, DeriveInput, Fields, Ident, Type, parse_macro_input};

/// Attribute configuration for a field.
#[derive(Default)]
struct FieldConfig {
  /// The config key name (defaults to field name).
  key: Option<String>,

  /// Whether this field is a nested `Configurable` struct.
  nested: bool,

  /// Allow empty values (set to None).
  allow_empty: bool,
}

impl FieldConfig {
  fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
    let mut config = Self::default();

    for attr in attrs {
      if !attr.path().is_ident("config") {
        continue;
      }

      attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("key") {
          let value = meta.value()?;
          let lit: syn::LitStr = value.parse()?;
          config.key = Some(lit.value());
        } else if meta.path.is_ident("allow_empty") {
          config.allow_empty = true;
        } else if meta.path.is_ident("nested") {
          config.nested = true;
        } else {
          return Err(meta.error("unsupported config attribute"));
        }
        Ok(())
      })?;
    }

    Ok(config)
  }
}

/// Token streams render generics with spaces (`Option < PathBuf >`), so
/// compare types with all whitespace removed.
fn type_string(ty: &Type) -> String {
  ty.to_token_stream()
    .to_string()
    .chars()
    .filter(|c| !c.is_whitespace())
    .collect()
}

/// Derive macro for configuration structs.
///
/// Generates `apply_override(key, value)` and `merge_fields(other)`. Fields
/// take part in overrides when they carry a `#[config(...)]` attribute;
/// `#[config(nested)]` fields must be `Option<T>` where `T` is itself
/// `Configurable`, and are addressed as `field.subkey`.
#[proc_macro_derive(Configurable, attributes(config))]
pub fn derive_configurable(input: TokenStream) -> TokenStream {
  let input = parse_macro_input!(input as DeriveInput);
  let name = &input.ident;
  let (impl_generics, ty_generics, where_clause) =
    input.generics.split_for_impl();

  let fields = match &input.data {
    Data::Struct(data) if matches!(data.fields, Fields::Named(_)) => {
      &data.fields
    },
    _ => {
      return syn::Error::new_spanned(
        input,
        "Configurable can only be derived for structs with named fields",
      )
      .to_compile_error()
      .into();
    },
  };

  let field_handlers = match generate_field_handlers(fields) {
    Ok(handlers) => handlers,
    Err(e) => return e.to_compile_error().into(),
  };
  let merge_handlers = match generate_merge_handlers(fields) {
    Ok(handlers) => handlers,
    Err(e) => return e.to_compile_error().into(),
  };

  let expanded = quote! {
    impl #impl_generics #name #ty_generics #where_clause {
      /// Apply a configuration override by key.
      pub fn apply_override(
        &mut self,
        key: &str,
        value: &str,
      ) -> std::result::Result<(), crate::error::ConfigError> {
        use crate::error::ConfigError;

        #(#field_handlers)*

        Err(ConfigError::Config(format!(
          "Unknown configuration key: '{key}'. See documentation for supported keys.",
        )))
      }

      /// Merge another config into this one.
      pub fn merge_fields(&mut self, other: Self) {
        #(#merge_handlers)*
      }
    }
  };

  TokenStream::from(expanded)
}

fn generate_field_handlers(
  fields: &Fields,
) -> syn::Result<Vec<proc_macro2::TokenStream>> {
  let mut handlers = Vec::new();

  for field in fields {
    let has_config_attr = field
      .attrs
      .iter()
      .any(|attr| attr.path().is_ident("config"));
    if !has_config_attr {
      continue;
    }

    let field_config = FieldConfig::from_attrs(&field.attrs)?;
    let Some(field_name) = field.ident.as_ref() else {
      continue;
    };
    let field_key = field_config
      .key
      .clone()
      .unwrap_or_else(|| field_name.to_string());

    handlers.push(generate_field_handler(
      field_name,
      &field_key,
      &field.ty,
      &field_config,
    ));
  }

  Ok(handlers)
}

fn generate_field_handler(
  field_name: &Ident,
  field_key: &str,
  field_type: &Type,
  config: &FieldConfig,
) -> proc_macro2::TokenStream {
  if config.nested {
    return generate_nested_handler(field_name, field_key);
  }

  let value_assignment =
    generate_value_assignment(field_name, field_key, field_type, config);

  quote! {
    if key == #field_key {
      #value_assignment
      return Ok(());
    }
  }
}

fn generate_nested_handler(
  field_name: &Ident,
  base_key: &str,
) -> proc_macro2::TokenStream {
  // Sub-keys like "markup.copy_button.enable" are handed down one level at a
  // time
  quote! {
    if let Some(subkey) = key
      .strip_prefix(#base_key)
      .and_then(|rest| rest.strip_prefix('.'))
    {
      return self
        .#field_name
        .get_or_insert_with(Default::default)
        .apply_override(subkey, value);
    }
  }
}

fn generate_value_assignment(
  field_name: &Ident,
  field_key: &str,
  field_type: &Type,
  config: &FieldConfig,
) -> proc_macro2::TokenStream {
  let type_str = type_string(field_type);

  if type_str.starts_with("Option<") {
    if config.allow_empty {
      quote! {
        self.#field_name = if value.is_empty() {
          None
        } else {
          Some(value.parse().map_err(|_| ConfigError::Config(
            format!("Invalid value for '{}': '{}'", #field_key, value)
          ))?)
        };
      }
    } else {
      quote! {
        self.#field_name = Some(value.parse().map_err(|_| ConfigError::Config(
          format!("Invalid value for '{}': '{}'", #field_key, value)
        ))?);
      }
    }
  } else if type_str == "PathBuf" || type_str.ends_with("::PathBuf") {
    quote! {
      self.#field_name = std::path::PathBuf::from(value);
    }
  } else if type_str == "String" {
    quote! {
      self.#field_name = value.to_string();
    }
  } else if type_str == "Vec<String>" {
    // Lists are written comma-separated: `extensions=mdx,md`
    quote! {
      self.#field_name = value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect();
    }
  } else if type_str == "bool" {
    quote! {
      self.#field_name = match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => true,
        "false" | "no" | "0" => false,
        _ => {
          return Err(ConfigError::Config(format!(
            "Invalid boolean value for '{}': '{}'. Expected true/false, yes/no, or 1/0",
            #field_key, value
          )));
        }
      };
    }
  } else if matches!(type_str.as_str(), "usize" | "u64" | "u32" | "u16" | "u8")
  {
    quote! {
      self.#field_name = value.parse::<#field_type>().map_err(|_| ConfigError::Config(format!(
        "Invalid value for '{}': '{}'. Expected a positive integer",
        #field_key, value
      )))?;
    }
  } else {
    // Anything else goes through its `FromStr` implementation
    quote! {
      self.#field_name = value.parse::<#field_type>().map_err(|e| ConfigError::Config(format!(
        "Invalid value for '{}': '{}' - {}",
        #field_key, value, e
      )))?;
    }
  }
}

fn generate_merge_handlers(
  fields: &Fields,
) -> syn::Result<Vec<proc_macro2::TokenStream>> {
  let mut handlers = Vec::new();

  for field in fields {
    let field_config = FieldConfig::from_attrs(&field.attrs)?;
    let Some(field_name) = field.ident.as_ref() else {
      continue;
    };
    let type_str = type_string(&field.ty);

    let handler = if field_config.nested {
      // Nested configs merge recursively when both sides are present
      quote! {
        match (self.#field_name.as_mut(), other.#field_name) {
          (Some(inner), Some(other_inner)) => inner.merge_fields(other_inner),
          (None, Some(other_inner)) => self.#field_name = Some(other_inner),
          _ => {}
        }
      }
    } else if type_str.starts_with("Option<") {
      quote! {
        if other.#field_name.is_some() {
          self.#field_name = other.#field_name;
        }
      }
    } else if type_str.starts_with("Vec<") {
      // Lists are appended, skipping entries already present
      quote! {
        for item in other.#field_name {
          if !self.#field_name.contains(&item) {
            self.#field_name.push(item);
          }
        }
      }
    } else {
      quote! {
        self.#field_name = other.#field_name;
      }
    };

    handlers.push(handler);
  }

  Ok(handlers)
}
