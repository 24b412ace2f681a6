/// Defines a monotonic id counter type named after `$tag`.
///
/// `define_id_generator!(anonymous, pub)` expands to `AnonymousIdGenerator`
/// with `next_anonymous_id` and `reset_anonymous_id`. The counter is a plain
/// value, so whoever owns it decides its lifetime.
#[macro_export]
macro_rules! define_id_generator {
    ($tag:ident$(, $visual:vis)?) => {
        ::paste::paste! {
            #[derive(Debug, Default)]
            $($visual)* struct [<$tag:camel IdGenerator>](u32);

            impl [<$tag:camel IdGenerator>] {
                $($visual)* fn [<next_ $tag _id>](&mut self) -> u32 {
                    let id = self.0;
                    self.0 += 1;
                    id
                }

                #[allow(dead_code)]
                $($visual)* fn [<reset_ $tag _id>](&mut self) {
                    self.0 = 0;
                }
            }
        }
    };
}
