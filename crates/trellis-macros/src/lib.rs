use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, ItemFn};

/// Marks a function as composable: its body runs inside a group keyed by the
/// function's definition site, so values remembered and nodes emitted by the
/// body are reused positionally across recompositions.
///
/// Signatures, generics, and return values pass through unchanged. The body is
/// moved into the group closure, so parameters are consumed by value exactly
/// as the original function consumed them.
#[proc_macro_attribute]
pub fn composable(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr_tokens = TokenStream2::from(attr);
    if !attr_tokens.is_empty() {
        return syn::Error::new_spanned(attr_tokens, "composable takes no arguments")
            .to_compile_error()
            .into();
    }

    let mut func = parse_macro_input!(item as ItemFn);
    let original_block = func.block.clone();
    let key_expr = quote! { trellis_core::location_key(file!(), line!(), column!()) };

    let wrapped = quote!({
        trellis_core::with_current_composer(|__composer: &trellis_core::Composer| {
            __composer.with_group(#key_expr, move || #original_block)
        })
    });
    func.block = Box::new(syn::parse2(wrapped).expect("failed to build composable block"));
    TokenStream::from(quote! { #func })
}
