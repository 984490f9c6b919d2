// SPDX-License-Identifier: MIT

//! Static description of the queryable dataset
//!
//! This text is the model's only view of the data. It has to match the
//! physical `Retail` table; `tests::test_seed_matches_description` in the
//! executor module checks the column list against the seed.

/// Name of the single queryable table
pub const RETAIL_TABLE: &str = "Retail";

/// Columns of the `Retail` table, in physical order
pub const RETAIL_COLUMNS: [&str; 14] = [
    "Customer_ID",
    "Name",
    "Gender",
    "Age",
    "Country",
    "State",
    "City",
    "Zip_Code",
    "Product",
    "Category",
    "Price",
    "Purchase_Date",
    "Quantity",
    "Total_Spent",
];

/// Schema text injected into the assessment and query prompts
pub const DATA_DESCRIPTION: &str = "\
You have access to the following tables and columns in a SQLite3 database:

Retail Table
Customer_ID: A unique ID that identifies each customer.
Name: The customer's name.
Gender: The customer's gender: Male, Female.
Age: The customer's age.
Country: The country where the customer resides.
State: The state where the customer resides.
City: The city where the customer resides.
Zip_Code: The zip code where the customer resides.
Product: The product purchased by the customer.
Category: The category of the product.
Price: The price of the product.
Purchase_Date: The date when the purchase was made.
Quantity: The quantity of the product purchased.
Total_Spent: The total amount spent by the customer.
";
