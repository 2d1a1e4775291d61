//! Derive macros for sketchbook.
//!
//! `#[derive(Entity)]` implements `sketchbook::Entity` for a plain struct so
//! an experiment can carry whatever per-entity data it needs and still run
//! through the shared store, step and renderer.
//!
//! # Usage
//!
//! The macro is re-exported from the main `sketchbook` crate:
//!
//! ```ignore
//! use sketchbook::prelude::*;
//!
//! #[derive(Entity, Clone)]
//! struct Ember {
//!     position: Vec2,
//!     velocity: Vec2,
//!     #[life]
//!     life: f32,
//!     #[max_life]
//!     max_life: f32,
//!     #[color]
//!     tint: Vec3,
//!     heat: f32,          // ignored by the macro
//! }
//! ```
//!
//! ## Required Fields
//!
//! - `position: Vec2` - screen-space position in pixels
//! - `velocity: Vec2` - pixels per tick
//!
//! ## Field Attributes
//!
//! | Attribute | Type | Trait method |
//! |-----------|------|--------------|
//! | `#[home]` | `Vec2` | `home()` for spring-to-home forces |
//! | `#[color]` | `Vec3` | `color()` |
//! | `#[alpha]` | `f32` | `alpha()` |
//! | `#[radius]` | `f32` | `radius()` |
//! | `#[life]` | `f32` | `age()` decrements it, `is_alive()` tests `> 0` |
//! | `#[max_life]` | `f32` | with `#[life]`, gives `life_fraction()` |

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Field, Fields, Ident, Type};

const MARKERS: [&str; 6] = ["home", "color", "alpha", "radius", "life", "max_life"];

/// Derive macro for entity structs.
///
/// # Panics
///
/// The macro panics at compile time if:
/// - Applied to an enum or a tuple struct
/// - `position` or `velocity` is missing or not a `Vec2`
/// - A marked field has the wrong type, or a marker is used twice
/// - `#[max_life]` is present without `#[life]`
#[proc_macro_derive(Entity, attributes(home, color, alpha, radius, life, max_life))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => panic!("Entity derive only supports structs with named fields"),
        },
        _ => panic!("Entity derive only supports structs"),
    };

    for required in ["position", "velocity"] {
        let field = fields
            .iter()
            .find(|f| f.ident.as_ref().map(|i| i == required).unwrap_or(false))
            .unwrap_or_else(|| {
                panic!("Entity struct '{}' must have a `{}: Vec2` field", name, required)
            });
        expect_type(field, "Vec2", required);
    }

    // Collect marked fields, one per marker.
    let mut marked: Vec<(&'static str, Ident)> = Vec::new();
    for field in fields.iter() {
        let field_name = field.ident.clone().expect("named field");
        for attr in &field.attrs {
            for marker in MARKERS {
                if attr.path().is_ident(marker) {
                    if marked.iter().any(|(m, _)| *m == marker) {
                        panic!("#[{}] may only be used on one field of '{}'", marker, name);
                    }
                    let expected = match marker {
                        "home" => "Vec2",
                        "color" => "Vec3",
                        _ => "f32",
                    };
                    expect_type(field, expected, &field_name.to_string());
                    marked.push((marker, field_name.clone()));
                }
            }
        }
    }
    let field_for = |marker: &str| {
        marked
            .iter()
            .find(|(m, _)| *m == marker)
            .map(|(_, f)| f.clone())
    };

    let home_impl = field_for("home").map(|f| {
        quote! {
            fn home(&self) -> Option<sketchbook::Vec2> {
                Some(self.#f)
            }
        }
    });
    let color_impl = field_for("color").map(|f| {
        quote! {
            fn color(&self) -> sketchbook::Vec3 {
                self.#f
            }
        }
    });
    let alpha_impl = field_for("alpha").map(|f| {
        quote! {
            fn alpha(&self) -> f32 {
                self.#f
            }
        }
    });
    let radius_impl = field_for("radius").map(|f| {
        quote! {
            fn radius(&self) -> f32 {
                self.#f
            }
        }
    });

    let life = field_for("life");
    let max_life = field_for("max_life");
    if max_life.is_some() && life.is_none() {
        panic!("#[max_life] on '{}' requires a #[life] field", name);
    }
    let life_impl = life.map(|life| {
        let fraction = max_life.map(|max| {
            quote! {
                fn life_fraction(&self) -> Option<f32> {
                    if self.#max > 0.0 {
                        Some((self.#life / self.#max).clamp(0.0, 1.0))
                    } else {
                        Some(0.0)
                    }
                }
            }
        });
        quote! {
            fn age(&mut self) {
                self.#life -= 1.0;
            }

            fn is_alive(&self) -> bool {
                self.#life > 0.0
            }

            #fraction
        }
    });

    let expanded = quote! {
        impl #impl_generics sketchbook::Entity for #name #ty_generics #where_clause {
            fn position(&self) -> sketchbook::Vec2 {
                self.position
            }

            fn set_position(&mut self, position: sketchbook::Vec2) {
                self.position = position;
            }

            fn velocity(&self) -> sketchbook::Vec2 {
                self.velocity
            }

            fn set_velocity(&mut self, velocity: sketchbook::Vec2) {
                self.velocity = velocity;
            }

            #home_impl
            #color_impl
            #alpha_impl
            #radius_impl
            #life_impl
        }
    };

    TokenStream::from(expanded)
}

/// Last path segment of a type, e.g. `glam::Vec2` -> `Vec2`.
fn type_name(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(path) => path.path.segments.last().map(|s| s.ident.to_string()),
        _ => None,
    }
}

fn expect_type(field: &Field, expected: &str, label: &str) {
    match type_name(&field.ty) {
        Some(ref found) if found == expected => {}
        found => panic!(
            "Entity field `{}` must be `{}`, found `{}`",
            label,
            expected,
            found.unwrap_or_else(|| "unsupported type".to_string())
        ),
    }
}
