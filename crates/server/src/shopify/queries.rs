//! Hand-written GraphQL query and mutation strings.
//!
//! Variable shapes are built with `serde_json::json!` at the call sites; the
//! response shapes live in [`super::types`].

/// Paged product listing (Storefront API).
pub const PRODUCTS_PAGE: &str = r"
query GetProducts($first: Int!, $after: String) {
  products(first: $first, after: $after) {
    pageInfo {
      hasNextPage
      endCursor
    }
    edges {
      node {
        id
        title
        description
        handle
        productType
        vendor
        tags
        collections(first: 10) {
          edges {
            node {
              id
              title
              handle
            }
          }
        }
        featuredImage { url }
        images(first: 5) {
          edges { node { url } }
        }
        variants(first: 1) {
          edges {
            node {
              id
              title
              sku
              price { amount currencyCode }
              compareAtPrice { amount }
              availableForSale
              quantityAvailable
              weight
              weightUnit
            }
          }
        }
      }
    }
  }
}";

/// Single product by id (Storefront API).
pub const PRODUCT_BY_ID: &str = r"
query GetProduct($id: ID!) {
  product(id: $id) {
    id
    title
    description
    handle
    productType
    vendor
    tags
    featuredImage { url }
    images(first: 10) {
      edges { node { url } }
    }
    variants(first: 10) {
      edges {
        node {
          id
          title
          sku
          price { amount currencyCode }
          compareAtPrice { amount }
          availableForSale
          quantityAvailable
          weight
          weightUnit
        }
      }
    }
  }
}";

/// Products in a collection by handle (Storefront API).
pub const COLLECTION_PRODUCTS: &str = r"
query GetCollectionProducts($handle: String!, $first: Int!) {
  collectionByHandle(handle: $handle) {
    id
    title
    products(first: $first) {
      edges {
        node {
          id
          title
          description
          handle
          productType
          vendor
          tags
          featuredImage { url }
          images(first: 5) {
            edges { node { url } }
          }
          variants(first: 1) {
            edges {
              node {
                id
                title
                sku
                price { amount currencyCode }
                compareAtPrice { amount }
                availableForSale
                quantityAvailable
                weight
                weightUnit
              }
            }
          }
        }
      }
    }
  }
}";

/// Cart creation (Cart API, replaces the deprecated Checkout API).
pub const CART_CREATE: &str = r"
mutation cartCreate($input: CartInput!) {
  cartCreate(input: $input) {
    cart {
      id
      checkoutUrl
      cost {
        totalAmount { amount currencyCode }
        subtotalAmount { amount currencyCode }
        totalTaxAmount { amount currencyCode }
      }
      lines(first: 250) {
        edges {
          node {
            id
            quantity
            merchandise {
              ... on ProductVariant {
                id
                title
                price { amount currencyCode }
                product { id title handle }
              }
            }
          }
        }
      }
      buyerIdentity { email }
    }
    userErrors {
      code
      field
      message
    }
  }
}";

/// Buyer identity update, used for both customer association and the
/// delivery address preference (Cart API).
pub const CART_BUYER_IDENTITY_UPDATE: &str = r"
mutation cartBuyerIdentityUpdate($cartId: ID!, $buyerIdentity: CartBuyerIdentityInput!) {
  cartBuyerIdentityUpdate(cartId: $cartId, buyerIdentity: $buyerIdentity) {
    cart {
      id
      checkoutUrl
      cost {
        totalAmount { amount currencyCode }
        subtotalAmount { amount currencyCode }
        totalTaxAmount { amount currencyCode }
      }
      lines(first: 250) {
        edges {
          node {
            id
            quantity
            merchandise {
              ... on ProductVariant {
                id
                title
                price { amount currencyCode }
                product { id title handle }
              }
            }
          }
        }
      }
      buyerIdentity { email }
    }
    userErrors {
      code
      field
      message
    }
  }
}";

/// Cart lookup by id (Cart API).
pub const CART_BY_ID: &str = r"
query getCart($id: ID!) {
  cart(id: $id) {
    id
    checkoutUrl
    cost {
      totalAmount { amount currencyCode }
      subtotalAmount { amount currencyCode }
      totalTaxAmount { amount currencyCode }
    }
    lines(first: 250) {
      edges {
        node {
          id
          quantity
          merchandise {
            ... on ProductVariant {
              id
              title
              price { amount currencyCode }
              product { id title handle }
            }
          }
        }
      }
    }
    buyerIdentity { email }
  }
}";

/// Customer profile with their recent orders (Storefront API).
pub const CUSTOMER_ORDERS: &str = r"
query getCustomer($customerAccessToken: String!) {
  customer(customerAccessToken: $customerAccessToken) {
    id
    email
    firstName
    lastName
    phone
    orders(first: 50) {
      edges {
        node {
          id
          orderNumber
          processedAt
          financialStatus
          fulfillmentStatus
          totalPrice { amount currencyCode }
          lineItems(first: 10) {
            edges {
              node {
                title
                quantity
                variant {
                  id
                  price { amount currencyCode }
                  image { url }
                }
              }
            }
          }
        }
      }
    }
  }
}";

/// Draft order creation (Admin API).
pub const DRAFT_ORDER_CREATE: &str = r"
mutation draftOrderCreate($input: DraftOrderInput!) {
  draftOrderCreate(input: $input) {
    draftOrder {
      id
      name
      status
    }
    userErrors {
      field
      message
    }
  }
}";

/// Draft order completion (Admin API).
pub const DRAFT_ORDER_COMPLETE: &str = r"
mutation draftOrderComplete($id: ID!) {
  draftOrderComplete(id: $id) {
    draftOrder {
      id
      order {
        id
        name
      }
    }
    userErrors {
      field
      message
    }
  }
}";
