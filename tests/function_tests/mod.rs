mod evaluation_test;
mod library_test;
mod property_test;
mod section_test;
